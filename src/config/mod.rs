//! Configuration module for Ripple-Crawl
//!
//! Configuration comes from an optional TOML file with command-line values
//! layered on top, and is validated before any crawl work starts.
//!
//! # Example
//!
//! ```no_run
//! use ripple_crawl::config::{load_config, validate};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! let limits = validate(&config).unwrap();
//! println!("Crawler will use max depth: {}", limits.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ExtractorKind, HttpConfig, OutputConfig, Overrides};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_crawler_config, CrawlLimits};
