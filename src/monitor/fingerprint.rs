//! Cheap change probe for a menu source
//!
//! A single conditional GET per source. The fingerprint is the SHA-256 of
//! the PDF bytes, or of the visible page text for HTML sources so that
//! per-request markup (nonces, CSRF tokens) does not read as a change.

use crate::config::Config;
use crate::crawler::{HttpRequest, HttpTransport};
use crate::extract::strip_text;
use crate::robots::RobotsGate;
use crate::storage::{MenuSourceRecord, SourceType};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Content hash plus the validators the server sent with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub value: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered 304 to our validators
    NotModified,
    /// Content was fetched and hashed
    Fetched(Fingerprint),
    /// No usable response; the reason is for logs
    Unavailable(String),
}

/// Issues the fingerprint request for a source
pub struct FingerprintProbe {
    transport: Arc<dyn HttpTransport>,
    robots: Arc<RobotsGate>,
    user_agent: String,
    html_timeout: Duration,
    pdf_timeout: Duration,
}

impl FingerprintProbe {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsGate>,
        user_agent: String,
        html_timeout: Duration,
        pdf_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            robots,
            user_agent,
            html_timeout,
            pdf_timeout,
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
            config.timeouts.pdf(),
        )
    }

    /// Probes `source`, sending its stored validators when it has a fingerprint
    pub async fn probe(&self, source: &MenuSourceRecord) -> ProbeOutcome {
        if !self.robots.allowed(&source.url).await {
            return ProbeOutcome::Unavailable("blocked by robots.txt".to_string());
        }

        let (accept, timeout) = match source.source_type {
            SourceType::Pdf => ("application/pdf,*/*", self.pdf_timeout),
            SourceType::Html => ("text/html,application/xhtml+xml", self.html_timeout),
        };

        let mut request = HttpRequest::get(source.url.as_str(), timeout)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", accept);

        // Without a fingerprint a 304 would leave nothing to compare against
        if source.last_fingerprint.is_some() {
            if let Some(etag) = &source.etag {
                request = request.header("If-None-Match", etag.as_str());
            }
            if let Some(last_modified) = &source.last_modified {
                request = request.header("If-Modified-Since", last_modified.as_str());
            }
        }

        let response = match self.transport.get(request).await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Unavailable(e.to_string()),
        };

        if response.status == 304 {
            return ProbeOutcome::NotModified;
        }
        if !response.is_success() {
            return ProbeOutcome::Unavailable(format!("HTTP {}", response.status));
        }

        let value = match source.source_type {
            SourceType::Pdf => fingerprint_bytes(&response.body),
            SourceType::Html => fingerprint_text(&strip_text(&response.text())),
        };

        ProbeOutcome::Fetched(Fingerprint {
            value,
            etag: response.header("etag").map(str::to_string),
            last_modified: response.header("last-modified").map(str::to_string),
        })
    }
}

/// Lowercase hex SHA-256 of raw bytes
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Lowercase hex SHA-256 of a text
pub fn fingerprint_text(text: &str) -> String {
    fingerprint_bytes(text.as_bytes())
}
