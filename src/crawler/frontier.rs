//! Crawl frontier: pending queue, visited set and outstanding-task accounting
//!
//! The frontier is owned by the coordinator's control path and is never shared
//! with workers, so none of its state needs a lock. A URL is admitted at most
//! once per run: the visited-set insert is the admission decision.

use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized URL to fetch
    pub url: String,

    /// Hops from the seed along the edge this URL was first discovered by
    pub depth: u32,

    /// Page this URL was discovered on (`None` for the seed)
    pub parent: Option<String>,
}

impl CrawlTask {
    /// Creates the depth-0 task for the seed URL
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            parent: None,
        }
    }
}

/// Outcome of offering a discovered link to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New URL, queued at the parent's depth + 1
    Accepted,
    /// URL was already admitted earlier in this run
    AlreadyVisited,
    /// Child depth would exceed the maximum depth
    TooDeep,
    /// Link could not be normalized into an HTTP(S) URL
    Invalid,
    /// The frontier stopped accepting work (deadline or interrupt)
    Closed,
}

/// Pending work and admission state for one crawl run
#[derive(Debug)]
pub struct Frontier {
    /// Normalized URLs admitted so far
    visited: HashSet<String>,

    /// Admitted tasks waiting for a free worker slot (FIFO)
    pending: VecDeque<CrawlTask>,

    /// Tasks admitted but not yet resolved (queued + executing)
    outstanding: usize,

    max_depth: u32,
    closed: bool,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new(max_depth: u32) -> Self {
        Self {
            visited: HashSet::new(),
            pending: VecDeque::new(),
            outstanding: 0,
            max_depth,
            closed: false,
        }
    }

    /// Schedules the seed URL at depth 0
    ///
    /// A seed that cannot be normalized is still scheduled verbatim so the
    /// fetcher reports it as a page error instead of the run failing silently.
    pub fn seed(&mut self, seed_url: &str) -> CrawlTask {
        let url = match normalize_url(seed_url, None) {
            Ok(normalized) => normalized.to_string(),
            Err(e) => {
                tracing::warn!("Seed URL {} could not be normalized: {}", seed_url, e);
                seed_url.trim().to_string()
            }
        };

        self.visited.insert(url.clone());
        let task = CrawlTask::seed(url);
        self.enqueue(task.clone());
        task
    }

    /// Offers a link discovered on `parent` for admission
    ///
    /// # Arguments
    ///
    /// * `parent` - The task whose page contained the link
    /// * `link` - The raw link as produced by the extractor
    /// * `base` - Parsed URL of the parent page, for relative links
    pub fn admit(&mut self, parent: &CrawlTask, link: &str, base: Option<&Url>) -> Admission {
        if self.closed {
            return Admission::Closed;
        }

        let depth = parent.depth + 1;
        if depth > self.max_depth {
            return Admission::TooDeep;
        }

        let normalized = match normalize_url(link, base) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Skipping link {} from {}: {}", link, parent.url, e);
                return Admission::Invalid;
            }
        };

        if !self.visited.insert(normalized.clone()) {
            return Admission::AlreadyVisited;
        }

        self.enqueue(CrawlTask {
            url: normalized,
            depth,
            parent: Some(parent.url.clone()),
        });
        Admission::Accepted
    }

    fn enqueue(&mut self, task: CrawlTask) {
        self.outstanding += 1;
        self.pending.push_back(task);
    }

    /// Takes the next task waiting for a worker slot
    ///
    /// The task stays outstanding until [`Frontier::resolve`] is called for it.
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        self.pending.pop_front()
    }

    /// Marks one outstanding task as resolved
    pub fn resolve(&mut self) {
        debug_assert!(self.outstanding > 0, "resolved more tasks than admitted");
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    /// True once nothing is queued and nothing is still executing
    ///
    /// An empty queue alone is not enough: tasks handed to workers remain
    /// outstanding and may still discover new links.
    pub fn is_exhausted(&self) -> bool {
        self.outstanding == 0 && self.pending.is_empty()
    }

    /// Stops admission and abandons every queued task
    ///
    /// Returns the abandoned tasks. Tasks already handed to workers remain
    /// outstanding until their results are resolved.
    pub fn close(&mut self) -> Vec<CrawlTask> {
        self.closed = true;
        let abandoned: Vec<CrawlTask> = self.pending.drain(..).collect();
        self.outstanding = self.outstanding.saturating_sub(abandoned.len());
        abandoned
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of tasks waiting for a worker slot
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of admitted tasks not yet resolved
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Number of distinct URLs admitted so far
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    #[cfg(test)]
    pub(crate) fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }
}
