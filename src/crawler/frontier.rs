//! Bounded breadth-first crawl frontier
//!
//! The frontier walks same-host links from a list of seeds in strict FIFO
//! order. Which links get followed is decided by a [`LinkPolicy`], and every
//! successfully fetched page is handed to a caller-supplied handler.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{extract_links, is_pdf_url, robots_meta, RobotsMeta};
use crate::url::{extract_host, is_same_host, normalize_crawl_url, parse_base_url};
use crate::UrlError;
use scraper::Html;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// What a single crawl invocation is allowed to cover
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub base_url: Url,
    /// Lowercase host every visited page must live on
    pub host: String,
    /// Upper bound on pages marked visited (fetched or not)
    pub max_pages: usize,
}

impl CrawlTarget {
    /// Builds a target from a user-supplied website address
    ///
    /// A `max_pages` of zero is raised to one so the base URL is always tried.
    pub fn new(base_url: &str, max_pages: usize) -> Result<Self, UrlError> {
        let base_url = parse_base_url(base_url)?;
        let host = extract_host(&base_url).ok_or(UrlError::MissingHost)?;

        Ok(Self {
            base_url,
            host,
            max_pages: max_pages.max(1),
        })
    }

    /// The base URL followed by each path hint resolved against the host
    pub fn seeds_with_hints(&self, hints: &[&str]) -> Vec<Url> {
        std::iter::once(self.base_url.clone())
            .chain(hints.iter().filter_map(|hint| self.base_url.join(hint).ok()))
            .collect()
    }
}

/// Decides which discovered links a crawl follows
pub trait LinkPolicy: Send + Sync {
    /// Whether a same-host, non-PDF link should be queued
    fn should_enqueue(&self, candidate: &Url) -> bool;

    /// Whether a same-host PDF link should be recorded in the report
    fn collect_pdf(&self, _candidate: &Url) -> bool {
        false
    }

    /// Whether a fetched page's robots meta directives exclude it
    fn skip_page(&self, meta: RobotsMeta) -> bool {
        meta.noindex
    }
}

/// Audit trail of one crawl
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Every URL marked visited, in visiting order
    pub visited: Vec<String>,
    /// PDF links collected through [`LinkPolicy::collect_pdf`], in discovery order
    pub pdfs: Vec<String>,
}

/// Breadth-first traversal bounded by [`CrawlTarget::max_pages`]
pub struct CrawlFrontier<'a> {
    fetcher: &'a PageFetcher,
    target: CrawlTarget,
}

impl<'a> CrawlFrontier<'a> {
    pub fn new(fetcher: &'a PageFetcher, target: CrawlTarget) -> Self {
        Self { fetcher, target }
    }

    /// Crawls from `seeds`, calling `handler(url, document, raw_html)` per page
    ///
    /// # Traversal
    ///
    /// 1. Pop the queue front; skip it if already visited
    /// 2. Mark it visited (this is what counts against `max_pages`)
    /// 3. Fetch it; failed, disallowed and policy-skipped pages end here
    /// 4. Run the handler, then queue unseen same-host links the policy accepts
    ///
    /// Links to `.pdf` paths are never queued; they are offered to
    /// [`LinkPolicy::collect_pdf`] instead.
    pub async fn crawl<F>(&self, seeds: Vec<Url>, policy: &dyn LinkPolicy, mut handler: F) -> CrawlReport
    where
        F: FnMut(&Url, &Html, &str),
    {
        let mut report = CrawlReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queued: HashSet<String> = HashSet::new();
        let mut pdfs_seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Url> = VecDeque::new();

        for seed in seeds {
            let seed = normalize_crawl_url(&seed);
            if is_same_host(&seed, &self.target.host) && queued.insert(seed.to_string()) {
                queue.push_back(seed);
            }
        }

        while report.visited.len() < self.target.max_pages {
            let Some(url) = queue.pop_front() else {
                break;
            };

            let key = url.to_string();
            if !visited.insert(key.clone()) {
                continue;
            }
            report.visited.push(key);

            let Some(body) = self.fetcher.fetch(url.as_str()).await else {
                continue;
            };

            let Some(links) = process_page(&url, &body, policy, &mut handler) else {
                tracing::debug!("Skipping page {} (robots meta)", url);
                continue;
            };

            for link in links {
                let link = normalize_crawl_url(&link);
                if !is_same_host(&link, &self.target.host) {
                    continue;
                }

                let link_key = link.to_string();
                if is_pdf_url(&link) {
                    if policy.collect_pdf(&link) && pdfs_seen.insert(link_key.clone()) {
                        report.pdfs.push(link_key);
                    }
                    continue;
                }

                if visited.contains(&link_key) || queued.contains(&link_key) {
                    continue;
                }

                if policy.should_enqueue(&link) {
                    queued.insert(link_key);
                    queue.push_back(link);
                }
            }
        }

        tracing::debug!(
            "Crawl of {} visited {} pages ({} queued unvisited, {} PDFs)",
            self.target.host,
            report.visited.len(),
            queue.len(),
            report.pdfs.len()
        );

        report
    }
}

/// Parses one page, runs the handler and returns its outbound links
///
/// Returns `None` for pages the policy skips on their robots meta directives.
fn process_page<F>(
    url: &Url,
    body: &str,
    policy: &dyn LinkPolicy,
    handler: &mut F,
) -> Option<Vec<Url>>
where
    F: FnMut(&Url, &Html, &str),
{
    let document = Html::parse_document(body);
    if policy.skip_page(robots_meta(&document)) {
        return None;
    }

    handler(url, &document, body);
    Some(extract_links(&document, url))
}
