//! State management module for Ripple-Crawl
//!
//! This module defines the outcome states a crawled page can end up in.

mod page_state;

pub use page_state::PageState;
