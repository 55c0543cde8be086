//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including statistics, failed pages and the list of fetched URLs.

use crate::output::report::CrawlReport;
use crate::output::stats::latency_summary;
use crate::CrawlError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the report to `output_path`
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(CrawlError)` - Failed to write summary
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> Result<(), CrawlError> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Ripple-Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed_url));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Status**: {}\n", report.status));
    md.push_str(&format!(
        "- **Limits**: {} workers, depth {}\n",
        report.max_workers, report.max_depth
    ));
    md.push_str(&format!(
        "- **Peak Concurrent Fetches**: {}\n\n",
        report.peak_concurrency
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.pages_fetched));
    md.push_str(&format!("- **Fetch Errors**: {}\n", stats.fetch_errors));
    md.push_str(&format!("- **Cancelled**: {}\n", stats.cancelled));
    md.push_str(&format!("- **Links Found**: {}\n", stats.links_found));
    md.push_str(&format!("- **URLs Admitted**: {}\n", stats.urls_admitted));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        stats.success_rate()
    ));
    if let Some(latency) = latency_summary(&report.pages) {
        md.push_str(&format!(
            "- **Request Latency**: mean {} ms, max {} ms\n",
            latency.mean.as_millis(),
            latency.max.as_millis()
        ));
    }
    md.push('\n');

    // Failed pages
    let failed: Vec<_> = report.failed_pages().collect();
    if !failed.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Depth | State | Error |\n");
        md.push_str("|-----|-------|-------|-------|\n");
        for page in failed {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                page.url,
                page.depth,
                page.state,
                page.error.as_deref().unwrap_or("").replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    // Fetched pages
    md.push_str("## Fetched Pages\n\n");
    md.push_str("| URL | Depth | Latency (ms) | Links |\n");
    md.push_str("|-----|-------|--------------|-------|\n");
    for page in report.fetched_pages() {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            page.url,
            page.depth,
            page.request_time.map(|d| d.as_millis()).unwrap_or(0),
            page.links_found
        ));
    }

    md
}
