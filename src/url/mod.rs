//! URL handling module for Menu-Scout
//!
//! This module provides base-URL parsing, crawl-URL normalization used for
//! visited-set membership, and host helpers for same-host restriction.

mod domain;
mod normalize;

pub use domain::{extract_host, host_without_www, is_same_host};
pub use normalize::{normalize_crawl_url, parse_base_url};
