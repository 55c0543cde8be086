use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Ripple-Crawl
///
/// Every table and field has a default, so an empty TOML file (or no file at
/// all) yields a usable configuration once a seed URL is supplied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl limits and scheduling behavior
///
/// `max_workers` and `max_depth` are kept signed so that negative values coming
/// from the command line or a file reach validation and are reported as
/// configuration errors rather than parse failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Seed URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of concurrently executing fetches
    #[serde(rename = "max-workers")]
    pub max_workers: i64,

    /// Maximum link depth from the seed (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: i64,

    /// Global deadline for the whole run (milliseconds)
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,

    /// How long in-flight fetches get to report back after cancellation (milliseconds)
    #[serde(rename = "shutdown-grace")]
    pub shutdown_grace_ms: u64,

    /// Log one line per fetched page
    pub verbose: bool,

    /// Which link extractor to run over page bodies
    pub extractor: ExtractorKind,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_workers: 3,
            max_depth: 3,
            timeout_ms: 5000,
            shutdown_grace_ms: 1000,
            verbose: false,
            extractor: ExtractorKind::Text,
        }
    }
}

impl CrawlerConfig {
    /// Global deadline as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Grace period granted to in-flight fetches on shutdown
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Link extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Scan the raw body text for absolute URLs
    Text,
    /// Parse the body as HTML and follow anchors and canonical links
    Html,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds); unset means only the global deadline applies
    #[serde(rename = "request-timeout")]
    pub request_timeout_ms: Option<u64>,

    /// TCP connect timeout (milliseconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout_ms: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("ripple-crawl/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_ms: None,
            connect_timeout_ms: 5000,
            max_redirects: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Optional path of a markdown summary written after the run
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,

    /// Print the discovery tree to stdout
    #[serde(rename = "show-tree")]
    pub show_tree: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_path: None,
            show_tree: true,
        }
    }
}

/// Values given on the command line, applied on top of the file configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed_url: Option<String>,
    pub max_workers: Option<i64>,
    pub max_depth: Option<i64>,
    pub timeout_ms: Option<u64>,
    pub verbose: bool,
    pub extractor: Option<ExtractorKind>,
    pub request_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub summary_path: Option<String>,
    pub hide_tree: bool,
}

impl Config {
    /// Applies command-line values; anything given there wins over the file
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(seed_url) = overrides.seed_url {
            self.crawler.seed_url = seed_url;
        }
        if let Some(max_workers) = overrides.max_workers {
            self.crawler.max_workers = max_workers;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.crawler.max_depth = max_depth;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.crawler.timeout_ms = timeout_ms;
        }
        if overrides.verbose {
            self.crawler.verbose = true;
        }
        if let Some(extractor) = overrides.extractor {
            self.crawler.extractor = extractor;
        }
        if let Some(request_timeout_ms) = overrides.request_timeout_ms {
            self.http.request_timeout_ms = Some(request_timeout_ms);
        }
        if let Some(user_agent) = overrides.user_agent {
            self.http.user_agent = user_agent;
        }
        if let Some(summary_path) = overrides.summary_path {
            self.output.summary_path = Some(summary_path);
        }
        if overrides.hide_tree {
            self.output.show_tree = false;
        }
    }
}
