use crate::UrlError;
use url::Url;

/// Normalizes a discovered URL before it is checked against the visited set
///
/// # Normalization Steps
///
/// 1. Parse the URL, resolving it against `base` when it is relative
/// 2. Reject anything that is not HTTP(S) or has no host
/// 3. Lowercase scheme and host, drop default ports and resolve dot segments
///    (done by the parser itself)
/// 4. Remove the fragment (everything after #)
/// 5. Empty path becomes /
///
/// Query strings are left untouched: two URLs that differ only in their query
/// are distinct pages.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
/// * `base` - The page the link was found on, used for relative forms
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM:80/a/../b#top", None).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/b");
/// ```
pub fn normalize_url(url_str: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let url_str = url_str.trim();

    let mut url = Url::options()
        .base_url(base)
        .parse(url_str)
        .map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.path().is_empty() {
        url.set_path("/");
    }

    Ok(url)
}
