//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with error classification
//! - Link extraction from page bodies
//! - The frontier (queue, visited set, outstanding counter)
//! - The bounded worker pool
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod worker;

pub use coordinator::{run_crawl, Coordinator};
pub use extractor::{HtmlExtractor, LinkExtractor, PatternExtractor};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{Admission, CrawlTask, Frontier};
pub use worker::{CrawlResult, SlotReport, WorkerPool};
