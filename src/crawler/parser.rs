//! HTML parser for extracting links and page directives
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a href>` tags)
//! - `<meta name="robots">` directives

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("static selector");
    static ref META_NAMED: Selector = Selector::parse("meta[name]").expect("static selector");
}

/// Indexing directives from `<meta name="robots">` tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RobotsMeta {
    pub noindex: bool,
    pub nosnippet: bool,
}

/// Collects the robots meta directives of a page
pub fn robots_meta(document: &Html) -> RobotsMeta {
    document
        .select(&META_NAMED)
        .filter(|meta| {
            meta.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("robots"))
        })
        .fold(RobotsMeta::default(), |meta, tag| {
            let content = tag.value().attr("content").unwrap_or("").to_lowercase();
            RobotsMeta {
                noindex: meta.noindex || content.contains("noindex"),
                nosnippet: meta.nosnippet || content.contains("nosnippet"),
            }
        })
}

/// Extracts all followable links from `<a href>` tags as absolute URLs
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - fragment-only links (same-page anchors)
/// - `<a href="..." download>`
/// - anything that does not resolve to HTTP(S)
///
/// Relative links are resolved against `page_url`.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    document
        .select(&ANCHOR)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

/// Checks whether a URL's path names a PDF document
pub fn is_pdf_url(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}
