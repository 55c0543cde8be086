//! Crawl report types
//!
//! A [`CrawlReport`] is returned by every run, whether it completed, hit the
//! deadline or was interrupted. Partial results are never discarded.

use crate::crawler::{CrawlResult, CrawlTask};
use crate::output::stats::CrawlStats;
use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every admitted task was resolved
    Completed,
    /// The global deadline fired first
    TimedOut,
    /// The run was cancelled from outside (Ctrl-C)
    Interrupted,
}

impl RunStatus {
    /// Returns true if the run stopped before the frontier was exhausted
    pub fn is_partial(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Completed => "completed",
            Self::TimedOut => "deadline exceeded",
            Self::Interrupted => "interrupted",
        };
        write!(f, "{}", s)
    }
}

/// One resolved task
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: String,
    pub depth: u32,
    pub parent: Option<String>,
    pub state: PageState,
    pub status_code: Option<u16>,
    pub request_time: Option<Duration>,
    pub worker_time: Duration,
    pub links_found: usize,
    pub error: Option<String>,
}

impl PageRecord {
    /// Builds the record for a finished slot
    pub fn from_result(result: &CrawlResult) -> Self {
        Self {
            url: result.task.url.clone(),
            depth: result.task.depth,
            parent: result.task.parent.clone(),
            state: result.state(),
            status_code: result.status_code,
            request_time: result.request_time,
            worker_time: result.worker_time,
            links_found: result.discovered.len(),
            error: result.error().map(|e| e.to_string()),
        }
    }

    /// Builds the record for a slot that panicked
    pub fn worker_failed(task: &CrawlTask, message: &str) -> Self {
        Self {
            url: task.url.clone(),
            depth: task.depth,
            parent: task.parent.clone(),
            state: PageState::WorkerFailed,
            status_code: None,
            request_time: None,
            worker_time: Duration::ZERO,
            links_found: 0,
            error: Some(message.to_string()),
        }
    }
}

/// Aggregate result of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub seed_url: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub max_workers: usize,
    pub max_depth: u32,
    /// Highest number of fetches that were executing at once
    pub peak_concurrency: usize,
    /// Resolved tasks in resolution order
    pub pages: Vec<PageRecord>,
    pub stats: CrawlStats,
}

impl CrawlReport {
    /// Looks up the record for a URL
    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|p| p.url == url)
    }

    /// Successfully fetched pages, in resolution order
    pub fn fetched_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|p| p.state.is_success())
    }

    /// Pages whose fetch failed for a reason other than cancellation
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|p| p.state.is_error())
    }
}
