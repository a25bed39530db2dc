//! Aggregates menu text across discovered HTML menu pages

use crate::crawler::{MenuPage, PageFetcher};
use crate::extract::ContentExtractor;
use serde::Serialize;

/// A menu page to scrape, either still to be fetched or already in hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Seed(String),
    Prefetched(String, String),
}

impl Page {
    pub fn url(&self) -> &str {
        match self {
            Page::Seed(url) | Page::Prefetched(url, _) => url,
        }
    }
}

impl From<MenuPage> for Page {
    fn from(page: MenuPage) -> Self {
        Page::Prefetched(page.url, page.html)
    }
}

/// Menu text gathered from one or more pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MenuText {
    /// Per-page sections, each headed `--- Menu page: {url} ---`
    pub menu_text: String,
    pub pages_scraped: usize,
    pub source_urls: Vec<String>,
}

impl MenuText {
    pub fn is_empty(&self) -> bool {
        self.pages_scraped == 0
    }
}

/// Runs [`ContentExtractor`] over a set of pages
pub struct MenuScraper<'a> {
    fetcher: &'a PageFetcher,
    extractor: ContentExtractor,
}

impl<'a> MenuScraper<'a> {
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self {
            fetcher,
            extractor: ContentExtractor::new(),
        }
    }

    /// Extracts and concatenates menu text, skipping pages that yield nothing
    ///
    /// Seeds (and prefetched pages with an empty body) are fetched through the
    /// robots-gated [`PageFetcher`].
    pub async fn scrape(&self, pages: Vec<Page>) -> MenuText {
        let mut sections = Vec::new();
        let mut source_urls = Vec::new();

        for page in pages {
            let (url, html) = match page {
                Page::Seed(url) => (url, None),
                Page::Prefetched(url, html) if html.trim().is_empty() => (url, None),
                Page::Prefetched(url, html) => (url, Some(html)),
            };

            if url.trim().is_empty() {
                continue;
            }

            let html = match html {
                Some(html) => html,
                None => match self.fetcher.fetch(&url).await {
                    Some(html) => html,
                    None => continue,
                },
            };

            let Some(text) = self.extractor.extract(&html) else {
                tracing::debug!("No menu text extracted from {}", url);
                continue;
            };

            sections.push(format!("--- Menu page: {} ---\n{}", url, text));
            source_urls.push(url);
        }

        MenuText {
            menu_text: sections.join("\n\n"),
            pages_scraped: source_urls.len(),
            source_urls,
        }
    }
}
