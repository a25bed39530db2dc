//! robots.txt handling module
//!
//! [`RobotsGate`] answers "may this URL be fetched?" for the crawler's own
//! user-agent. It fetches `/robots.txt` once per origin, caches the parsed
//! rules for a bounded time, and fails open: any problem obtaining or reading
//! robots.txt results in the URL being allowed.

mod cache;
mod matcher;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use matcher::matches_path_pattern;
pub use parser::{AgentRules, RobotsPolicy};

use crate::config::Config;
use crate::crawler::{HttpRequest, HttpTransport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Identity and timeout used for robots.txt requests
#[derive(Debug, Clone)]
pub struct RobotsSettings {
    /// Bot name matched against `User-agent:` groups
    pub agent: String,
    /// Full User-Agent header value
    pub user_agent: String,
    pub timeout: Duration,
}

impl RobotsSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            agent: config.user_agent.crawler_name.clone(),
            user_agent: config.user_agent.header_value(),
            timeout: config.timeouts.robots(),
        }
    }
}

/// Outcome of looking up robots.txt for one origin
#[derive(Debug, Clone)]
enum RobotsLookup {
    Found(Arc<RobotsPolicy>),
    NotFound,
    Failed(String),
}

/// Whether robots.txt existed when evidence was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotsStatus {
    Found,
    NotFound,
    NoHost,
    Error,
}

/// Audit record of a robots.txt decision for one URL
#[derive(Debug, Clone, Serialize)]
pub struct RobotsEvidence {
    pub robots_txt: RobotsStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_error: Option<String>,
    pub robots_checked_at: DateTime<Utc>,
}

/// Polite-access gate backed by a robots.txt cache
pub struct RobotsGate {
    transport: Arc<dyn HttpTransport>,
    settings: RobotsSettings,
    cache: RobotsCache,
}

impl RobotsGate {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        settings: RobotsSettings,
        cache: RobotsCache,
    ) -> Self {
        Self {
            transport,
            settings,
            cache,
        }
    }

    pub fn cache(&self) -> &RobotsCache {
        &self.cache
    }

    /// Checks if `url` may be fetched
    ///
    /// Unparseable URLs, URLs without a host, missing robots.txt and fetch
    /// failures all allow.
    pub async fn allowed(&self, url: &str) -> bool {
        let Some((robots_url, path)) = robots_target(url) else {
            return true;
        };

        match self.lookup(&robots_url).await {
            RobotsLookup::Found(policy) => {
                let allowed = policy.is_allowed(&path, &self.settings.agent);
                if !allowed {
                    tracing::debug!("robots.txt disallows {}", url);
                }
                allowed
            }
            RobotsLookup::NotFound => true,
            RobotsLookup::Failed(error) => {
                tracing::warn!("robots.txt check failed for {}: {} (allowing)", url, error);
                true
            }
        }
    }

    /// Collects the robots.txt decision for `url` as an audit record
    pub async fn evidence(&self, url: &str) -> RobotsEvidence {
        let checked_at = self.cache.now();

        let Some((robots_url, path)) = robots_target(url) else {
            return RobotsEvidence {
                robots_txt: RobotsStatus::NoHost,
                robots_allowed: None,
                robots_error: None,
                robots_checked_at: checked_at,
            };
        };

        match self.lookup(&robots_url).await {
            RobotsLookup::Found(policy) => RobotsEvidence {
                robots_txt: RobotsStatus::Found,
                robots_allowed: Some(policy.is_allowed(&path, &self.settings.agent)),
                robots_error: None,
                robots_checked_at: checked_at,
            },
            RobotsLookup::NotFound => RobotsEvidence {
                robots_txt: RobotsStatus::NotFound,
                robots_allowed: Some(true),
                robots_error: None,
                robots_checked_at: checked_at,
            },
            RobotsLookup::Failed(error) => RobotsEvidence {
                robots_txt: RobotsStatus::Error,
                robots_allowed: None,
                robots_error: Some(error),
                robots_checked_at: checked_at,
            },
        }
    }

    async fn lookup(&self, robots_url: &str) -> RobotsLookup {
        if let Some(cached) = self.cache.get(robots_url) {
            return match cached.policy {
                Some(policy) => RobotsLookup::Found(policy),
                None => RobotsLookup::NotFound,
            };
        }

        let request = HttpRequest::get(robots_url, self.settings.timeout)
            .header("User-Agent", self.settings.user_agent.as_str())
            .header("Accept", "text/plain");

        match self.transport.get(request).await {
            Ok(response) if response.status == 200 => {
                let policy = Arc::new(RobotsPolicy::parse(&response.text()));
                tracing::debug!("Cached robots.txt from {}", robots_url);
                self.cache.insert(robots_url, Some(policy.clone()));
                RobotsLookup::Found(policy)
            }
            Ok(response) => {
                tracing::debug!(
                    "No robots.txt at {} (HTTP {}), allowing all",
                    robots_url,
                    response.status
                );
                self.cache.insert(robots_url, None);
                RobotsLookup::NotFound
            }
            Err(e) => RobotsLookup::Failed(e.to_string()),
        }
    }
}

/// Splits a URL into its origin's robots.txt URL and the path to test
///
/// The query string does not take part in matching.
fn robots_target(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }

    let robots_url = parsed.join("/robots.txt").ok()?.to_string();
    Some((robots_url, parsed.path().to_string()))
}
