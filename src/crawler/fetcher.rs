//! HTML and PDF fetchers
//!
//! Both fetchers consult the [`RobotsGate`] before every request and never
//! surface errors to the caller: timeouts, non-2xx responses, wrong content
//! types and transport failures are all normalized to "no content".

use crate::config::Config;
use crate::crawler::transport::{HttpRequest, HttpTransport};
use crate::robots::RobotsGate;
use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml";
const PDF_ACCEPT: &str = "application/pdf,*/*";

/// Result of an HTML fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Success {
        /// Content-Type header value (may be empty)
        content_type: String,
        /// Page body content
        body: String,
    },

    /// robots.txt forbids fetching this URL
    Disallowed,

    /// Response status outside 2xx
    HttpError { status_code: u16 },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch { content_type: String },

    /// Network error (connection refused, timeout, etc.)
    NetworkError { error: String },
}

impl FetchOutcome {
    /// The HTML body, if the fetch succeeded
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchOutcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Robots-gated HTML fetcher
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    robots: Arc<RobotsGate>,
    user_agent: String,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsGate>,
        user_agent: String,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            robots,
            user_agent,
            timeout,
        }
    }

    pub fn from_config(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsGate>,
    ) -> Self {
        Self::new(
            transport,
            robots,
            config.user_agent.header_value(),
            config.timeouts.html(),
        )
    }

    pub fn robots(&self) -> &RobotsGate {
        &self.robots
    }

    /// Fetches `url` and returns the HTML body, or `None` on any failure
    pub async fn fetch(&self, url: &str) -> Option<String> {
        self.fetch_page(url).await.into_body()
    }

    /// Fetches `url`, reporting why a fetch produced no content
    ///
    /// # Acceptance
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | robots.txt disallows | `Disallowed` |
    /// | transport error / timeout | `NetworkError` |
    /// | status outside 2xx | `HttpError` |
    /// | Content-Type present without `text/html` | `ContentMismatch` |
    /// | otherwise | `Success` |
    pub async fn fetch_page(&self, url: &str) -> FetchOutcome {
        if !self.robots.allowed(url).await {
            return FetchOutcome::Disallowed;
        }

        let request = HttpRequest::get(url, self.timeout)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", HTML_ACCEPT);

        let response = match self.transport.get(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", url, e);
                return FetchOutcome::NetworkError {
                    error: e.to_string(),
                };
            }
        };

        if !response.is_success() {
            tracing::debug!("HTTP {} for {}", response.status, url);
            return FetchOutcome::HttpError {
                status_code: response.status,
            };
        }

        let content_type = response.header("content-type").unwrap_or("").to_string();
        if !content_type.is_empty() && !content_type.contains("text/html") {
            tracing::debug!("Skipping {} with content-type {}", url, content_type);
            return FetchOutcome::ContentMismatch { content_type };
        }

        FetchOutcome::Success {
            content_type,
            body: response.text(),
        }
    }
}

/// Robots-gated PDF downloader
pub struct PdfFetcher {
    transport: Arc<dyn HttpTransport>,
    robots: Arc<RobotsGate>,
    user_agent: String,
    timeout: Duration,
}

impl PdfFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsGate>,
        user_agent: String,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            robots,
            user_agent,
            timeout,
        }
    }

    pub fn from_config(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsGate>,
    ) -> Self {
        Self::new(
            transport,
            robots,
            config.user_agent.header_value(),
            config.timeouts.pdf(),
        )
    }

    /// Downloads the raw PDF bytes
    pub async fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
        if !self.robots.allowed(url).await {
            tracing::debug!("robots.txt blocks PDF {}", url);
            return None;
        }

        let request = HttpRequest::get(url, self.timeout)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", PDF_ACCEPT);

        let response = match self.transport.get(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("PDF fetch failed for {}: {}", url, e);
                return None;
            }
        };

        if !response.is_success() {
            tracing::debug!("HTTP {} for PDF {}", response.status, url);
            return None;
        }

        let content_type = response
            .header("content-type")
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.contains("pdf") && !has_pdf_path(url) {
            tracing::debug!("Not a PDF: {} ({})", url, content_type);
            return None;
        }

        Some(response.body)
    }

    /// Downloads `url` into a temporary file rewound to its start
    ///
    /// The file is removed when the returned handle is dropped.
    pub async fn download(&self, url: &str) -> Option<NamedTempFile> {
        let bytes = self.fetch_bytes(url).await?;
        match write_temp_pdf(&bytes) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Could not write PDF {} to a temp file: {}", url, e);
                None
            }
        }
    }
}

/// Writes PDF bytes to a fresh temporary file positioned at offset 0
pub fn write_temp_pdf(bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("menu-")
        .suffix(".pdf")
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

fn has_pdf_path(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
}
