//! Output module for crawl reports
//!
//! This module handles:
//! - The report returned by every run
//! - Printing crawl statistics and the discovery tree
//! - Writing a markdown summary

mod markdown;
mod report;
pub mod stats;
mod tree;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{CrawlReport, PageRecord, RunStatus};
pub use stats::{format_statistics, print_statistics, CrawlStats};
pub use tree::format_tree;

/// Prints the discovery tree (optionally) followed by the statistics block
pub fn print_report(report: &CrawlReport, show_tree: bool) {
    if show_tree && !report.pages.is_empty() {
        println!("=== Discovery Tree ===\n");
        print!("{}", format_tree(report));
        println!();
    }
    print_statistics(report);
}
