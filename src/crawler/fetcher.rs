//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from configuration
//! - GET requests to fetch page content
//! - Error classification (malformed URL, transport, status, body)
//!
//! Cancellation is not handled here: the worker slot races every fetch against
//! the run's cancellation token and drops the request future when it fires.

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code (always 2xx)
    pub status: u16,
    /// Decoded page body
    pub body: String,
}

/// Performs a single GET for the crawler
///
/// Implementations must classify failures into [`FetchError`] variants. The
/// returned future may be dropped at any await point when the run is cancelled.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::HttpConfig;
/// use ripple_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true);

    if let Some(timeout_ms) = config.request_timeout_ms {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }

    builder.build()
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl Fetcher for HttpFetcher {
    /// Fetches a URL and returns its body
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Unparseable URL, non-HTTP(S) scheme | `InvalidUrl` |
    /// | Connection refused, DNS failure, request timeout | `Transport` |
    /// | Any non-2xx status | `Status` |
    /// | Body read failure | `Body` |
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let body = decode_body(url, content_type.as_deref(), &bytes)?;

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}

/// Decodes a response body strictly according to its declared charset
///
/// UTF-8 is assumed when no charset is declared. Invalid byte sequences and
/// charsets other than UTF-8, US-ASCII and ISO-8859-1 yield `FetchError::Body`.
fn decode_body(url: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<String, FetchError> {
    let body_error = |reason: String| FetchError::Body {
        url: url.to_string(),
        reason,
    };

    let charset = content_type
        .and_then(declared_charset)
        .unwrap_or_else(|| "utf-8".to_string());

    match charset.as_str() {
        "utf-8" | "utf8" => String::from_utf8(bytes.to_vec())
            .map_err(|e| body_error(format!("invalid UTF-8: {}", e.utf8_error()))),
        "us-ascii" | "ascii" => {
            if bytes.is_ascii() {
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            } else {
                Err(body_error("non-ASCII byte in US-ASCII body".to_string()))
            }
        }
        // Every byte maps to the code point of the same value
        "iso-8859-1" | "latin1" | "latin-1" => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        other => Err(body_error(format!("unsupported charset {}", other))),
    }
}

/// Returns the lowercased `charset` parameter of a Content-Type value
fn declared_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_ascii_lowercase())
        } else {
            None
        }
    })
}

/// Maps a reqwest send error onto the fetch error taxonomy
fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
            reason: error.to_string(),
        }
    } else if error.is_timeout() {
        FetchError::Transport {
            url: url.to_string(),
            reason: "request timeout".to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transport {
            url: url.to_string(),
            reason: format!("connection failed: {}", error),
        }
    } else if error.is_redirect() {
        FetchError::Transport {
            url: url.to_string(),
            reason: format!("redirect error: {}", error),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
