use crate::config::types::{
    Config, CrawlerConfig, RobotsConfig, StorageConfig, TimeoutConfig, UserAgentConfig,
    MAX_ROBOTS_CACHE_TTL_SECS,
};
use crate::ConfigError;
use url::Url;

const MAX_PAGE_BOUND: usize = 200;
const MAX_TIMEOUT_SECS: u64 = 120;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_timeouts(&config.timeouts)?;
    validate_robots_config(&config.robots)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("max_menu_pages", config.max_menu_pages),
        ("max_contact_pages", config.max_contact_pages),
    ] {
        if !(1..=MAX_PAGE_BOUND).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_PAGE_BOUND, value
            )));
        }
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

fn validate_timeouts(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("robots_secs", config.robots_secs),
        ("html_secs", config.html_secs),
        ("pdf_secs", config.pdf_secs),
    ] {
        if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_TIMEOUT_SECS, value
            )));
        }
    }

    Ok(())
}

fn validate_robots_config(config: &RobotsConfig) -> Result<(), ConfigError> {
    if !(1..=MAX_ROBOTS_CACHE_TTL_SECS).contains(&config.cache_ttl_secs) {
        return Err(ConfigError::Validation(format!(
            "cache_ttl_secs must be between 1 and {}, got {}",
            MAX_ROBOTS_CACHE_TTL_SECS, config.cache_ttl_secs
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.baseline_dir.is_empty() {
        return Err(ConfigError::Validation(
            "baseline_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
