//! URL handling module for Ripple-Crawl
//!
//! Discovered links are normalized here before they reach the visited set, so
//! that trivially different spellings of one page are fetched only once.

mod normalize;

pub use normalize::normalize_url;
