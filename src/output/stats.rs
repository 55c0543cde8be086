//! Crawl statistics
//!
//! Counters are filled in by the coordinator while the run progresses; the
//! latency summary is derived from the page records afterwards.

use crate::output::report::{CrawlReport, PageRecord};
use crate::state::PageState;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Counters collected during a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched and parsed successfully
    pub pages_fetched: usize,

    /// Pages that failed with a fetch error (cancellation excluded)
    pub fetch_errors: usize,

    /// Fetches aborted by the deadline or an interrupt
    pub cancelled: usize,

    /// Worker slots that panicked
    pub worker_failures: usize,

    /// URLs admitted into the frontier, seed included
    pub urls_admitted: usize,

    /// Links skipped because their URL was already admitted
    pub duplicates_skipped: usize,

    /// Links not followed because they would exceed the maximum depth
    pub depth_pruned: usize,

    /// Links that could not be normalized into an HTTP(S) URL
    pub invalid_links: usize,

    /// Queued tasks dropped when the run stopped early
    pub abandoned: usize,

    /// Total links reported by the extractor across all pages
    pub links_found: usize,
}

impl CrawlStats {
    /// Number of tasks that reached a terminal state
    pub fn resolved(&self) -> usize {
        self.pages_fetched + self.fetch_errors + self.cancelled + self.worker_failures
    }

    /// Percentage of attempted pages that were fetched successfully
    ///
    /// Cancelled fetches are left out: they say nothing about the pages.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_fetched + self.fetch_errors + self.worker_failures;
        if attempted == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / attempted as f64) * 100.0
        }
    }
}

/// Request latency over successfully fetched pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub mean: Duration,
    pub max: Duration,
}

/// Summarizes request latency of fetched pages, if there are any
pub fn latency_summary(pages: &[PageRecord]) -> Option<LatencySummary> {
    let latencies: Vec<Duration> = pages
        .iter()
        .filter(|p| p.state.is_success())
        .filter_map(|p| p.request_time)
        .collect();

    let max = latencies.iter().max().copied()?;
    let total: Duration = latencies.iter().sum();
    let mean = total / latencies.len() as u32;

    Some(LatencySummary { mean, max })
}

/// Counts pages by state, in state order
pub fn pages_by_state(pages: &[PageRecord]) -> BTreeMap<PageState, usize> {
    let mut counts = BTreeMap::new();
    for page in pages {
        *counts.entry(page.state).or_insert(0) += 1;
    }
    counts
}

/// Formats the statistics block of a report
pub fn format_statistics(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Seed: {}", report.seed_url);
    let _ = writeln!(out, "  Status: {}", report.status);
    let _ = writeln!(out, "  Started: {}", report.started_at.to_rfc3339());
    let _ = writeln!(out, "  Elapsed: {:?}", report.elapsed);
    let _ = writeln!(
        out,
        "  Limits: {} workers, depth {}",
        report.max_workers, report.max_depth
    );
    let _ = writeln!(out, "  Peak concurrent fetches: {}", report.peak_concurrency);
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Fetched: {}", stats.pages_fetched);
    let _ = writeln!(out, "  Fetch errors: {}", stats.fetch_errors);
    let _ = writeln!(out, "  Cancelled: {}", stats.cancelled);
    if stats.worker_failures > 0 {
        let _ = writeln!(out, "  Worker failures: {}", stats.worker_failures);
    }
    if stats.abandoned > 0 {
        let _ = writeln!(out, "  Abandoned in queue: {}", stats.abandoned);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Links:");
    let _ = writeln!(out, "  Found: {}", stats.links_found);
    let _ = writeln!(out, "  URLs admitted: {}", stats.urls_admitted);
    let _ = writeln!(out, "  Duplicates skipped: {}", stats.duplicates_skipped);
    let _ = writeln!(out, "  Beyond max depth: {}", stats.depth_pruned);
    let _ = writeln!(out, "  Invalid: {}", stats.invalid_links);
    let _ = writeln!(out);

    let counts = pages_by_state(&report.pages);
    let errors: Vec<(PageState, usize)> = PageState::ALL
        .iter()
        .filter(|state| state.is_error())
        .filter_map(|state| counts.get(state).map(|count| (*state, *count)))
        .collect();
    if !errors.is_empty() {
        let _ = writeln!(out, "Error Summary:");
        for (state, count) in errors {
            let _ = writeln!(out, "  {}: {}", state, count);
        }
        let _ = writeln!(out);
    }

    if let Some(latency) = latency_summary(&report.pages) {
        let _ = writeln!(
            out,
            "Request latency: mean {:?}, max {:?}",
            latency.mean, latency.max
        );
    }

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} attempted pages)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_fetched + stats.fetch_errors + stats.worker_failures
    );

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    print!("{}", format_statistics(report));
}
