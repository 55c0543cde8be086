//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier and dispatching tasks to free worker slots
//! - Expanding fetched pages into new tasks
//! - Detecting termination through the outstanding-task counter
//! - Stopping at the global deadline or on interrupt
//! - Building the final report
//!
//! All frontier and statistics mutation happens here, on one control path.

use crate::config::{validate, validate_crawler_config, Config, CrawlerConfig, ExtractorKind};
use crate::crawler::extractor::{HtmlExtractor, LinkExtractor, PatternExtractor};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{Admission, Frontier};
use crate::crawler::worker::{CrawlResult, SlotReport, WorkerPool};
use crate::output::{CrawlReport, CrawlStats, PageRecord, RunStatus};
use crate::state::PageState;
use crate::{ConfigError, CrawlError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator<F, E> {
    seed_url: String,
    max_workers: usize,
    max_depth: u32,
    shutdown_grace: Duration,
    verbose: bool,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    interrupt: CancellationToken,
}

impl<F: Fetcher, E: LinkExtractor> Coordinator<F, E> {
    /// Creates a new coordinator instance
    ///
    /// Nothing is spawned here: an invalid configuration is rejected before
    /// any work starts.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Performs the HTTP GET for each task
    /// * `extractor` - Turns fetched bodies into candidate links
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration is valid
    /// * `Err(ConfigError)` - Empty seed, `max_workers < 1`, `max_depth < 0`, ...
    pub fn new(config: &CrawlerConfig, fetcher: F, extractor: E) -> Result<Self, ConfigError> {
        let limits = validate_crawler_config(config)?;

        Ok(Self {
            seed_url: config.seed_url.clone(),
            max_workers: limits.max_workers,
            max_depth: limits.max_depth,
            shutdown_grace: config.shutdown_grace(),
            verbose: config.verbose,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            interrupt: CancellationToken::new(),
        })
    }

    /// Stops the run early when `interrupt` is cancelled
    ///
    /// The report of an interrupted run carries [`RunStatus::Interrupted`].
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Runs the main crawl loop until the frontier is exhausted, the deadline
    /// passes or the run is interrupted
    ///
    /// Page failures are recorded in the report; this never fails.
    pub async fn run(self, deadline: Instant) -> CrawlReport {
        let started_at = Utc::now();
        let start_time = Instant::now();

        // Child token: shutting the pool down must not cancel the caller's token
        let cancel = self.interrupt.child_token();
        let mut pool = WorkerPool::new(
            self.fetcher,
            self.extractor,
            self.max_workers,
            cancel.clone(),
            self.verbose,
        );

        let mut run = CrawlRun::new(self.max_depth);
        let seed = run.frontier.seed(&self.seed_url);
        run.stats.urls_admitted += 1;

        tracing::info!(
            "Starting crawl of {} ({} workers, max depth {})",
            seed.url,
            self.max_workers,
            self.max_depth
        );

        let status = loop {
            while pool.has_capacity() {
                match run.frontier.next_task() {
                    Some(task) => pool.dispatch(task),
                    None => break,
                }
            }

            if run.frontier.is_exhausted() {
                tracing::info!("Frontier is empty, crawl complete");
                break RunStatus::Completed;
            }

            tokio::select! {
                biased;
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!("Deadline exceeded, stopping crawl");
                    break RunStatus::TimedOut;
                }
                _ = cancel.cancelled() => {
                    tracing::warn!("Crawl interrupted");
                    break RunStatus::Interrupted;
                }
                report = pool.next_result() => match report {
                    Some(report) => run.absorb(report, true),
                    None => {
                        // Outstanding tasks but nothing queued or running
                        tracing::error!(
                            "{} tasks outstanding with no worker running",
                            run.frontier.outstanding()
                        );
                        break RunStatus::Completed;
                    }
                },
            }

            let resolved = run.stats.resolved();
            if resolved > 0 && resolved % 10 == 0 && run.last_progress != resolved {
                run.last_progress = resolved;
                let rate = resolved as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages resolved, {} queued, {} in flight, {:.2} pages/sec",
                    resolved,
                    run.frontier.pending_len(),
                    pool.in_flight(),
                    rate
                );
            }
        };

        if status.is_partial() {
            let abandoned = run.frontier.close();
            run.stats.abandoned = abandoned.len();
            if !abandoned.is_empty() {
                tracing::info!("Abandoned {} queued tasks", abandoned.len());
            }

            // Drained results are recorded but never expanded
            for report in pool.shutdown(self.shutdown_grace).await {
                run.absorb(report, false);
            }
        }

        let elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl {}: {} pages fetched, {} errors, {} cancelled, {} unique URLs seen in {:?}",
            status,
            run.stats.pages_fetched,
            run.stats.fetch_errors + run.stats.worker_failures,
            run.stats.cancelled,
            run.frontier.visited_len(),
            elapsed
        );

        CrawlReport {
            seed_url: seed.url,
            status,
            started_at,
            elapsed,
            max_workers: self.max_workers,
            max_depth: self.max_depth,
            peak_concurrency: pool.peak(),
            pages: run.pages,
            stats: run.stats,
        }
    }
}

/// Mutable state of one run, owned by the control loop
struct CrawlRun {
    frontier: Frontier,
    stats: CrawlStats,
    pages: Vec<PageRecord>,
    max_depth: u32,
    last_progress: usize,
}

impl CrawlRun {
    fn new(max_depth: u32) -> Self {
        Self {
            frontier: Frontier::new(max_depth),
            stats: CrawlStats::default(),
            pages: Vec::new(),
            max_depth,
            last_progress: 0,
        }
    }

    /// Resolves one outstanding task from a slot report
    fn absorb(&mut self, report: SlotReport, expand: bool) {
        self.frontier.resolve();

        match report {
            SlotReport::Completed(result) => {
                match result.state() {
                    PageState::Fetched => self.stats.pages_fetched += 1,
                    PageState::Cancelled => self.stats.cancelled += 1,
                    _ => self.stats.fetch_errors += 1,
                }
                self.stats.links_found += result.discovered.len();

                if expand && result.outcome.is_ok() {
                    self.expand(&result);
                }
                self.pages.push(PageRecord::from_result(&result));
            }
            SlotReport::Panicked { task, message } => {
                tracing::error!("Worker failed on {}: {}", task.url, message);
                self.stats.worker_failures += 1;
                self.pages.push(PageRecord::worker_failed(&task, &message));
            }
        }
    }

    /// Offers every link of a fetched page to the frontier
    fn expand(&mut self, result: &CrawlResult) {
        if result.depth() >= self.max_depth {
            self.stats.depth_pruned += result.discovered.len();
            return;
        }

        let base = Url::parse(result.source_url()).ok();
        for link in &result.discovered {
            match self.frontier.admit(&result.task, link, base.as_ref()) {
                Admission::Accepted => self.stats.urls_admitted += 1,
                Admission::AlreadyVisited => self.stats.duplicates_skipped += 1,
                Admission::TooDeep => self.stats.depth_pruned += 1,
                Admission::Invalid => self.stats.invalid_links += 1,
                Admission::Closed => break,
            }
        }
    }
}

/// Runs the main crawl operation
///
/// Validates the whole configuration, builds the HTTP fetcher and the
/// configured extractor, then crawls until `deadline`.
///
/// # Arguments
///
/// * `config` - The full configuration
/// * `deadline` - Instant at which the run is cut short
/// * `interrupt` - Token that stops the run early when cancelled
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished (completed or partial)
/// * `Err(CrawlError)` - Invalid configuration or HTTP client setup failure
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::load_config;
/// use ripple_crawl::crawler::run_crawl;
/// use std::path::Path;
/// use tokio::time::Instant;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawl.toml"))?;
/// let deadline = Instant::now() + config.crawler.timeout();
/// let report = run_crawl(&config, deadline, CancellationToken::new()).await?;
/// println!("{} pages fetched", report.stats.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    deadline: Instant,
    interrupt: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    validate(config)?;
    let fetcher = HttpFetcher::from_config(&config.http)?;

    let report = match config.crawler.extractor {
        ExtractorKind::Text => {
            Coordinator::new(&config.crawler, fetcher, PatternExtractor)?
                .with_interrupt(interrupt)
                .run(deadline)
                .await
        }
        ExtractorKind::Html => {
            Coordinator::new(&config.crawler, fetcher, HtmlExtractor)?
                .with_interrupt(interrupt)
                .run(deadline)
                .await
        }
    };

    Ok(report)
}
