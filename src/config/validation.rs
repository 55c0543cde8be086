use crate::config::types::{Config, CrawlerConfig, HttpConfig};
use crate::ConfigError;

/// Upper bound for the shutdown grace period (milliseconds)
const MAX_SHUTDOWN_GRACE_MS: u64 = 60_000;

/// Crawl limits after validation, in the types the scheduler works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_workers: usize,
    pub max_depth: u32,
}

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<CrawlLimits, ConfigError> {
    let limits = validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    Ok(limits)
}

/// Validates crawler configuration and converts the limits
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<CrawlLimits, ConfigError> {
    if config.seed_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "You have to pass at least one seed url".to_string(),
        ));
    }

    if config.max_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be at least 1, got {}",
            config.max_workers
        )));
    }

    if config.max_depth < 0 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 0, got {}",
            config.max_depth
        )));
    }

    let max_workers = usize::try_from(config.max_workers).map_err(|_| {
        ConfigError::Validation(format!("max_workers is too large: {}", config.max_workers))
    })?;
    let max_depth = u32::try_from(config.max_depth).map_err(|_| {
        ConfigError::Validation(format!("max_depth is too large: {}", config.max_depth))
    })?;

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1ms".to_string(),
        ));
    }

    if config.shutdown_grace_ms > MAX_SHUTDOWN_GRACE_MS {
        return Err(ConfigError::Validation(format!(
            "shutdown_grace must be <= {}ms, got {}ms",
            MAX_SHUTDOWN_GRACE_MS, config.shutdown_grace_ms
        )));
    }

    Ok(CrawlLimits {
        max_workers,
        max_depth,
    })
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(0) = config.request_timeout_ms {
        return Err(ConfigError::Validation(
            "request_timeout must be at least 1ms when set".to_string(),
        ));
    }

    if config.connect_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout must be at least 1ms".to_string(),
        ));
    }

    Ok(())
}
