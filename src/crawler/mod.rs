//! Crawler module for polite page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - The HTTP transport seam and its reqwest implementation
//! - Robots-gated HTML and PDF fetchers
//! - HTML link extraction
//! - The bounded breadth-first crawl frontier
//! - Menu discovery built on the frontier

mod fetcher;
mod frontier;
mod menu_finder;
mod parser;
mod transport;

pub use fetcher::{write_temp_pdf, FetchOutcome, PageFetcher, PdfFetcher};
pub use frontier::{CrawlFrontier, CrawlReport, CrawlTarget, LinkPolicy};
pub use menu_finder::{
    has_menu_content, has_strong_menu_content, is_excluded_path, is_menu_page, url_score,
    MenuDiscovery, MenuFinder, MenuLinkPolicy, MenuPage, DEFAULT_MAX_MENU_PAGES,
};
pub use parser::{extract_links, is_pdf_url, resolve_link, robots_meta, RobotsMeta};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

#[cfg(test)]
pub(crate) use fetcher::test_support;
#[cfg(test)]
pub(crate) use transport::fake;
