//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl link crawler.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{load_config, validate, Config, ExtractorKind, Overrides};
use ripple_crawl::crawler::run_crawl;
use ripple_crawl::output::{generate_markdown_summary, print_report};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration failures
const EXIT_CONFIG_ERROR: u8 = 2;

/// Ripple-Crawl: a bounded-concurrency link crawler
///
/// Ripple-Crawl starts from a seed URL, follows every link it finds up to a
/// maximum depth with a fixed number of concurrent fetches, and stops when
/// nothing is left to fetch or the global deadline passes.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A bounded-concurrency link crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Maximum number of concurrent fetches [default: 3]
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    workers: Option<i64>,

    /// Global deadline in milliseconds, measured from program start [default: 5000]
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Maximum link depth from the seed [default: 3]
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    depth: Option<i64>,

    /// Log every fetched page; repeat for more logging (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Link extractor to run over page bodies
    #[arg(long, value_enum)]
    extractor: Option<ExtractorKind>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    request_timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Write a markdown summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<String>,

    /// Do not print the discovery tree
    #[arg(long)]
    no_tree: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed_url: self.url.clone(),
            max_workers: self.workers,
            max_depth: self.depth,
            timeout_ms: self.timeout,
            verbose: self.verbose > 0,
            extractor: self.extractor,
            request_timeout_ms: self.request_timeout,
            user_agent: self.user_agent.clone(),
            summary_path: self.summary.clone(),
            hide_tree: self.no_tree,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // The deadline counts from here, not from the first fetch
    let process_start = Instant::now();
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            eprintln!("error: {:#}", e);
            return Ok(ExitCode::from(EXIT_CONFIG_ERROR));
        }
    };

    let deadline = process_start + config.crawler.timeout();
    let interrupt = CancellationToken::new();
    spawn_interrupt_handler(interrupt.clone());

    let report = run_crawl(&config, deadline, interrupt)
        .await
        .context("Crawl failed")?;

    print_report(&report, config.output.show_tree);

    if let Some(summary_path) = &config.output.summary_path {
        generate_markdown_summary(&report, Path::new(summary_path))
            .with_context(|| format!("Failed to write summary to {}", summary_path))?;
        println!("\n✓ Summary written to: {}", summary_path);
    }

    Ok(ExitCode::SUCCESS)
}

/// Loads the optional config file, applies command-line values and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    config.apply_overrides(cli.overrides());
    validate(&config)?;

    Ok(config)
}

/// Cancels `interrupt` on Ctrl-C
fn spawn_interrupt_handler(interrupt: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Received Ctrl-C, stopping crawl");
                interrupt.cancel();
            }
            Err(e) => tracing::error!("Unable to listen for Ctrl-C: {}", e),
        }
    });
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` wins over the command-line verbosity when it is set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            // Only show errors
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("ripple_crawl=info,warn"),
                1 => EnvFilter::new("ripple_crawl=debug,info"),
                _ => EnvFilter::new("ripple_crawl=trace,debug"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_map_to_overrides() {
        let cli = Cli::parse_from([
            "ripple-crawl",
            "--url",
            "https://example.com/",
            "--workers",
            "5",
            "--depth",
            "0",
            "--timeout",
            "250",
            "-v",
            "--extractor",
            "html",
            "--no-tree",
        ]);

        let mut config = Config::default();
        config.apply_overrides(cli.overrides());

        assert_eq!(config.crawler.seed_url, "https://example.com/");
        assert_eq!(config.crawler.max_workers, 5);
        assert_eq!(config.crawler.max_depth, 0);
        assert_eq!(config.crawler.timeout_ms, 250);
        assert!(config.crawler.verbose);
        assert_eq!(config.crawler.extractor, ExtractorKind::Html);
        assert!(!config.output.show_tree);
    }

    #[test]
    fn test_negative_values_reach_validation() {
        let cli = Cli::parse_from(["ripple-crawl", "--url", "https://example.com/", "--depth", "-1"]);
        let err = build_config(&cli).unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn test_missing_seed_is_a_config_error() {
        let cli = Cli::parse_from(["ripple-crawl"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ripple-crawl", "-q", "-v"]).is_err());
    }
}
