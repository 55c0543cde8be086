//! Ripple-Crawl: a bounded-concurrency link crawler
//!
//! Starting from a seed URL, this crate fetches pages, extracts every URL-like
//! string they contain and follows the discovered links up to a maximum depth,
//! with a fixed number of concurrent fetches and a single global deadline.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Ripple-Crawl operations
///
/// Only configuration and setup problems end up here. Failures of individual
/// pages are recorded in the crawl report instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Errors produced by a single fetch attempt
///
/// `Cancelled` is kept apart from the other variants so that pages we ran out
/// of time for are never counted as broken pages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("malformed URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("status code not 2xx, got {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("could not read or decode body of {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("fetch of {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns true if the fetch was aborted by the run's cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Ripple-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use output::{CrawlReport, RunStatus};
pub use state::PageState;
pub use crate::url::normalize_url;
