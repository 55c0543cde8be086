use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file is only parsed here. Validation happens after command-line
/// overrides have been applied, since the seed URL may come from either place.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully parsed configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ripple_crawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[crawler]
seed-url = "https://example.com/"
max-workers = 8
max-depth = 2
timeout = 15000
shutdown-grace = 250
verbose = true
extractor = "html"

[http]
user-agent = "TestCrawler/1.0"
request-timeout = 3000
connect-timeout = 1000
max-redirects = 3

[output]
summary-path = "./summary.md"
show-tree = false
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.seed_url, "https://example.com/");
        assert_eq!(config.crawler.max_workers, 8);
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.timeout_ms, 15000);
        assert_eq!(config.crawler.shutdown_grace_ms, 250);
        assert!(config.crawler.verbose);
        assert_eq!(config.crawler.extractor, ExtractorKind::Html);
        assert_eq!(config.http.user_agent, "TestCrawler/1.0");
        assert_eq!(config.http.request_timeout_ms, Some(3000));
        assert_eq!(config.http.max_redirects, 3);
        assert_eq!(config.output.summary_path.as_deref(), Some("./summary.md"));
        assert!(!config.output.show_tree);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = create_temp_config("[crawler]\nmax-depth = 0\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 0);
        assert_eq!(config.crawler.max_workers, 3);
        assert!(config.crawler.seed_url.is_empty());
        assert!(config.http.request_timeout_ms.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.timeout_ms, 5000);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/crawl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_extractor_is_rejected() {
        let result = parse_config("[crawler]\nextractor = \"pdf\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
