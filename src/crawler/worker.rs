//! Bounded worker pool
//!
//! The pool owns a fixed number of execution slots backed by a
//! [`JoinSet`]. Each slot runs fetch then extract for one task and reports one
//! [`CrawlResult`]. Slots share nothing mutable: the fetcher and extractor are
//! behind `Arc`, and the cancellation token is only ever read.

use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::CrawlTask;
use crate::state::PageState;
use crate::FetchError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of one fetch attempt, produced by a worker slot
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The task this result resolves
    pub task: CrawlTask,

    /// URLs found on the page, in extraction order (may contain duplicates)
    pub discovered: Vec<String>,

    /// `Ok` if the page was fetched and parsed
    pub outcome: Result<(), FetchError>,

    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,

    /// Time spent in the HTTP request
    pub request_time: Option<Duration>,

    /// Time the slot spent on the whole task
    pub worker_time: Duration,
}

impl CrawlResult {
    /// Creates the result for a task aborted by cancellation
    pub fn cancelled(task: CrawlTask, worker_time: Duration) -> Self {
        let url = task.url.clone();
        Self {
            task,
            discovered: Vec::new(),
            outcome: Err(FetchError::Cancelled { url }),
            status_code: None,
            request_time: None,
            worker_time,
        }
    }

    /// URL the result belongs to
    pub fn source_url(&self) -> &str {
        &self.task.url
    }

    /// Depth of the fetched page
    pub fn depth(&self) -> u32 {
        self.task.depth
    }

    /// The fetch error, if the attempt failed
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    /// Outcome classification
    pub fn state(&self) -> PageState {
        PageState::from_outcome(&self.outcome)
    }
}

/// What a slot hands back to the coordinator
#[derive(Debug)]
pub enum SlotReport {
    /// The slot ran to completion (successfully or not)
    Completed(CrawlResult),

    /// The slot panicked; the task produced no result
    Panicked { task: CrawlTask, message: String },
}

/// Fixed-size pool of worker slots
pub struct WorkerPool<F, E> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
    slots: usize,
    running: JoinSet<CrawlResult>,
    in_flight: HashMap<Id, CrawlTask>,
    cancel: CancellationToken,
    verbose: bool,
    peak: usize,
}

impl<F: Fetcher, E: LinkExtractor> WorkerPool<F, E> {
    /// Creates a pool with `slots` execution slots
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared fetcher used by every slot
    /// * `extractor` - Shared link extractor used by every slot
    /// * `slots` - Maximum number of concurrently executing tasks (at least 1)
    /// * `cancel` - Run-wide cancellation signal observed by every slot
    /// * `verbose` - Log one line per page at info level instead of debug
    pub fn new(
        fetcher: Arc<F>,
        extractor: Arc<E>,
        slots: usize,
        cancel: CancellationToken,
        verbose: bool,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            slots: slots.max(1),
            running: JoinSet::new(),
            in_flight: HashMap::new(),
            cancel,
            verbose,
            peak: 0,
        }
    }

    /// Returns true if a slot is free
    pub fn has_capacity(&self) -> bool {
        self.running.len() < self.slots
    }

    /// Number of tasks currently executing
    pub fn in_flight(&self) -> usize {
        self.running.len()
    }

    /// Highest number of simultaneously executing tasks seen so far
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Starts a task in a free slot
    ///
    /// Callers must check [`WorkerPool::has_capacity`] first; the pool never
    /// queues work itself.
    pub fn dispatch(&mut self, task: CrawlTask) {
        debug_assert!(self.has_capacity(), "dispatch without a free slot");

        let slot = run_slot(
            task.clone(),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            self.cancel.clone(),
            self.verbose,
        );
        let handle = self.running.spawn(slot);
        self.in_flight.insert(handle.id(), task);
        self.peak = self.peak.max(self.running.len());
    }

    /// Waits for the next slot to finish
    ///
    /// Returns `None` when no slot is running.
    pub async fn next_result(&mut self) -> Option<SlotReport> {
        loop {
            let joined = self.running.join_next_with_id().await?;
            if let Some(report) = self.settle(joined) {
                return Some(report);
            }
        }
    }

    /// Cancels every slot and collects what they report within `grace`
    ///
    /// Slots still running after the grace period are aborted and reported as
    /// cancelled. When this returns no slot task is left alive.
    pub async fn shutdown(&mut self, grace: Duration) -> Vec<SlotReport> {
        self.cancel.cancel();

        let mut reports = Vec::new();
        let deadline = Instant::now() + grace;

        loop {
            match tokio::time::timeout_at(deadline, self.running.join_next_with_id()).await {
                Ok(Some(joined)) => reports.extend(self.settle(joined)),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "{} fetches did not stop within {:?}, aborting them",
                        self.running.len(),
                        grace
                    );
                    self.running.abort_all();
                    while let Some(joined) = self.running.join_next_with_id().await {
                        reports.extend(self.settle(joined));
                    }
                    break;
                }
            }
        }

        reports
    }

    /// Matches a joined slot back to its task
    fn settle(&mut self, joined: Result<(Id, CrawlResult), JoinError>) -> Option<SlotReport> {
        match joined {
            Ok((id, result)) => {
                self.in_flight.remove(&id);
                Some(SlotReport::Completed(result))
            }
            Err(err) => {
                let Some(task) = self.in_flight.remove(&err.id()) else {
                    tracing::error!("Worker slot {} finished without a known task", err.id());
                    return None;
                };

                if err.is_cancelled() {
                    Some(SlotReport::Completed(CrawlResult::cancelled(
                        task,
                        Duration::ZERO,
                    )))
                } else {
                    let message = panic_message(err);
                    Some(SlotReport::Panicked { task, message })
                }
            }
        }
    }
}

/// Extracts a readable message from a panicked slot
fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "worker panicked".to_string()
            }
        }
        Err(err) => err.to_string(),
    }
}

/// Runs one task in a slot: fetch, then extract
async fn run_slot<F: Fetcher, E: LinkExtractor>(
    task: CrawlTask,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    cancel: CancellationToken,
    verbose: bool,
) -> CrawlResult {
    let worker_started = Instant::now();

    if cancel.is_cancelled() {
        return CrawlResult::cancelled(task, worker_started.elapsed());
    }

    let request_started = Instant::now();
    let fetched = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled { url: task.url.clone() }),
        result = fetcher.fetch(&task.url) => result,
    };
    let request_time = request_started.elapsed();

    let page = match fetched {
        Ok(page) => page,
        Err(error) => {
            let status_code = error.status();
            if error.is_cancelled() {
                tracing::debug!("Fetch of {} cancelled", task.url);
            } else {
                tracing::warn!("{}", error);
            }
            return CrawlResult {
                task,
                discovered: Vec::new(),
                outcome: Err(error),
                status_code,
                request_time: Some(request_time),
                worker_time: worker_started.elapsed(),
            };
        }
    };

    // Deadline may have fired while the body was being read
    if cancel.is_cancelled() {
        return CrawlResult::cancelled(task, worker_started.elapsed());
    }

    let discovered = match Url::parse(&task.url) {
        Ok(page_url) => extractor.extract(&page.body, &page_url),
        Err(_) => Vec::new(),
    };

    let worker_time = worker_started.elapsed();
    if verbose {
        tracing::info!(
            "Worker[{:?}]Request[{:?}] {} links found on page {}",
            worker_time,
            request_time,
            discovered.len(),
            task.url
        );
    } else {
        tracing::debug!(
            "Worker[{:?}]Request[{:?}] {} links found on page {}",
            worker_time,
            request_time,
            discovered.len(),
            task.url
        );
    }

    CrawlResult {
        task,
        discovered,
        outcome: Ok(()),
        status_code: Some(page.status),
        request_time: Some(request_time),
        worker_time,
    }
}
