//! Configuration module for Menu-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file (or `Config::default()`) is valid.
//!
//! # Example
//!
//! ```no_run
//! use menu_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("menu-scout.toml")).unwrap();
//! println!("Contact crawl bound: {}", config.crawler.max_contact_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, RobotsConfig, StorageConfig, TimeoutConfig, UserAgentConfig,
    MAX_ROBOTS_CACHE_TTL_SECS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
