use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Menu-Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Crawl bounds
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum pages visited while looking for menus
    #[serde(rename = "max-menu-pages", default = "default_max_menu_pages")]
    pub max_menu_pages: usize,

    /// Maximum pages visited while mining contact information
    #[serde(rename = "max-contact-pages", default = "default_max_contact_pages")]
    pub max_contact_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_menu_pages: default_max_menu_pages(),
            max_contact_pages: default_max_contact_pages(),
        }
    }
}

fn default_max_menu_pages() -> usize {
    20
}

fn default_max_contact_pages() -> usize {
    8
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler; also the agent name matched against robots.txt groups
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

fn default_crawler_name() -> String {
    "SmartMenuBot".to_string()
}

fn default_crawler_version() -> String {
    "1.0".to_string()
}

fn default_contact_url() -> String {
    "https://www.mellow.menu".to_string()
}

/// Per-request timeouts, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    #[serde(rename = "robots-secs", default = "default_robots_secs")]
    pub robots_secs: u64,

    #[serde(rename = "html-secs", default = "default_html_secs")]
    pub html_secs: u64,

    #[serde(rename = "pdf-secs", default = "default_pdf_secs")]
    pub pdf_secs: u64,
}

impl TimeoutConfig {
    pub fn robots(&self) -> Duration {
        Duration::from_secs(self.robots_secs)
    }

    pub fn html(&self) -> Duration {
        Duration::from_secs(self.html_secs)
    }

    pub fn pdf(&self) -> Duration {
        Duration::from_secs(self.pdf_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            robots_secs: default_robots_secs(),
            html_secs: default_html_secs(),
            pdf_secs: default_pdf_secs(),
        }
    }
}

fn default_robots_secs() -> u64 {
    10
}

fn default_html_secs() -> u64 {
    20
}

fn default_pdf_secs() -> u64 {
    30
}

/// Longest accepted robots.txt cache lifetime (one week)
pub const MAX_ROBOTS_CACHE_TTL_SECS: u64 = 7 * 24 * 3600;

/// robots.txt cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RobotsConfig {
    /// How long a fetched robots.txt stays valid
    #[serde(rename = "cache-ttl-secs", default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl RobotsConfig {
    /// Cache lifetime, clamped to [`MAX_ROBOTS_CACHE_TTL_SECS`]
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.min(MAX_ROBOTS_CACHE_TTL_SECS) as i64)
    }
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding menu sources and change reviews
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Directory holding the single-generation baseline per source
    #[serde(rename = "baseline-dir", default = "default_baseline_dir")]
    pub baseline_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            baseline_dir: default_baseline_dir(),
        }
    }
}

fn default_database_path() -> String {
    "./menu_sources.db".to_string()
}

fn default_baseline_dir() -> String {
    "./baselines".to_string()
}
