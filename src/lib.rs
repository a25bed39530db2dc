//! Menu-Scout: a polite restaurant-website crawler
//!
//! This crate discovers menu content and contact information on restaurant
//! websites while respecting robots.txt, and monitors previously discovered
//! menu sources for changes with a two-tier fingerprint/diff pipeline.

pub mod clock;
pub mod config;
pub mod contact;
pub mod crawler;
pub mod extract;
pub mod monitor;
pub mod output;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Menu-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] crawler::TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("PDF text extraction failed: {0}")]
    PdfText(#[from] monitor::PdfTextError),

    #[error("Menu source {0} not found")]
    SourceNotFound(i64),

    #[error("Change review {0} not found")]
    ReviewNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Menu-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use contact::{ContactEvidence, ContactInfoMiner};
pub use crawler::{CrawlFrontier, CrawlTarget, MenuDiscovery, MenuFinder, PageFetcher, PdfFetcher};
pub use extract::{ContentExtractor, MenuScraper, MenuText, Page};
pub use monitor::SourceMonitor;
pub use robots::{RobotsEvidence, RobotsGate};
