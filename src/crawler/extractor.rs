//! Link extraction from fetched page bodies
//!
//! Two extractors are provided:
//! - [`PatternExtractor`] scans arbitrary text for absolute URLs
//! - [`HtmlExtractor`] parses HTML and follows anchors and canonical links
//!
//! Neither deduplicates nor normalizes its output. The scheduler does both
//! before the visited-set check.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Strict URL shape: a scheme followed by `://` and a run of URL characters
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b[a-z][a-z0-9+.\-]*://[^\s<>"'`{}|\\^\[\]]+"#)
        .expect("Invalid URL pattern regex")
});

/// Characters that end a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '*'];

/// Turns a page body into candidate URLs
pub trait LinkExtractor: Send + Sync + 'static {
    /// Returns every absolute URL found in `body`
    ///
    /// `page_url` is the address the body was fetched from; extractors that
    /// understand relative links resolve them against it.
    fn extract(&self, body: &str, page_url: &Url) -> Vec<String>;
}

/// Finds absolute URLs anywhere in a body of text
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl LinkExtractor for PatternExtractor {
    fn extract(&self, body: &str, _page_url: &Url) -> Vec<String> {
        URL_PATTERN
            .find_iter(body)
            .map(|m| trim_url_candidate(m.as_str()))
            .filter(|candidate| is_absolute_url(candidate))
            .map(str::to_string)
            .collect()
    }
}

/// Strips trailing punctuation and unbalanced closing parentheses
///
/// `https://en.wikipedia.org/wiki/Rust_(programming_language)` keeps its
/// closing parenthesis while `(see https://example.com/x).` loses both the
/// parenthesis and the period.
fn trim_url_candidate(candidate: &str) -> &str {
    let mut end = candidate.len();

    loop {
        let current = &candidate[..end];
        let Some(last) = current.chars().last() else {
            break;
        };

        if TRAILING_PUNCTUATION.contains(&last) {
            end -= last.len_utf8();
            continue;
        }

        if last == ')' {
            let opens = current.matches('(').count();
            let closes = current.matches(')').count();
            if closes > opens {
                end -= 1;
                continue;
            }
        }

        break;
    }

    &candidate[..end]
}

/// Returns true if the candidate parses as an absolute URL with a host
fn is_absolute_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

/// Extracts links from HTML markup
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that is not HTTP(S) after resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl LinkExtractor for HtmlExtractor {
    fn extract(&self, body: &str, page_url: &Url) -> Vec<String> {
        let document = Html::parse_document(body);
        let mut links = Vec::new();

        // Extract links from <a> tags
        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                if element.value().attr("download").is_some() {
                    continue;
                }

                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute_url) = resolve_link(href, page_url) {
                        links.push(absolute_url);
                    }
                }
            }
        }

        // Extract canonical link
        if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
            for element in document.select(&canonical_selector) {
                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute_url) = resolve_link(href, page_url) {
                        links.push(absolute_url);
                    }
                }
            }
        }

        links
    }
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
