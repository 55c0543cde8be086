//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the real HTTP fetcher.

use ripple_crawl::config::{Config, ExtractorKind};
use ripple_crawl::crawler::run_crawl;
use ripple_crawl::output::{format_tree, generate_markdown_summary, RunStatus};
use ripple_crawl::state::PageState;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling from `seed`
fn create_test_config(seed: &str, max_workers: i64, max_depth: i64) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = seed.to_string();
    config.crawler.max_workers = max_workers;
    config.crawler.max_depth = max_depth;
    config.crawler.shutdown_grace_ms = 200;
    config.http.user_agent = "RippleTestBot/1.0".to_string();
    config
}

fn deadline_in(duration: Duration) -> Instant {
    Instant::now() + duration
}

/// Mounts a GET handler answering `body` at `route`, expected `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Index links to two pages; both link back and to each other
    mount_page(
        &mock_server,
        "/",
        format!("Start here: {0}/page1 and {0}/page2.", base_url),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        format!("Back to {0}/ or on to {0}/page2 or {0}/page3", base_url),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        format!("See {0}/page1, {0}/page1#top and {0}/", base_url),
        1,
    )
    .await;
    mount_page(&mock_server, "/page3", "The end".to_string(), 1).await;

    let seed = format!("{}/", base_url);
    let config = create_test_config(&seed, 3, 3);

    let report = run_crawl(&config, deadline_in(Duration::from_secs(10)), CancellationToken::new())
        .await
        .expect("crawl should start");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.stats.pages_fetched, 4);
    assert_eq!(report.stats.fetch_errors, 0);
    assert_eq!(report.page(&seed).unwrap().depth, 0);
    assert_eq!(report.page(&format!("{}/page1", base_url)).unwrap().depth, 1);
    assert_eq!(report.page(&format!("{}/page3", base_url)).unwrap().depth, 2);
    assert!(report.peak_concurrency <= 3);

    let tree = format_tree(&report);
    assert!(tree.starts_with(&seed));
    assert_eq!(tree.lines().count(), 4);

    // MockServer verifies the expected call counts on drop
}

#[tokio::test]
async fn test_depth_limit_is_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", format!("{}/level1", base_url), 1).await;
    mount_page(&mock_server, "/level1", format!("{}/level2", base_url), 1).await;
    mount_page(&mock_server, "/level2", "too deep".to_string(), 0).await;

    let config = create_test_config(&format!("{}/", base_url), 2, 1);
    let report = run_crawl(&config, deadline_in(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.depth_pruned, 1);
    assert!(report.page(&format!("{}/level2", base_url)).is_none());
}

#[tokio::test]
async fn test_seed_returning_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/missing", mock_server.uri());
    let config = create_test_config(&seed, 3, 3);
    let report = run_crawl(&config, deadline_in(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.pages.len(), 1);

    let page = report.page(&seed).unwrap();
    assert_eq!(page.state, PageState::HttpError);
    assert_eq!(page.status_code, Some(404));
    assert!(page.error.as_ref().unwrap().contains("404"));
}

#[tokio::test]
async fn test_undecodable_body_is_a_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/binary"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0xff, 0xfe, 0x80, 0x81, 0x20, 0x78], "text/plain; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/binary", mock_server.uri());
    let report = run_crawl(
        &create_test_config(&seed, 2, 2),
        deadline_in(Duration::from_secs(10)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.stats.pages_fetched, 0);
    assert_eq!(report.stats.fetch_errors, 1);

    let page = report.page(&seed).unwrap();
    assert_eq!(page.state, PageState::Undecodable);
    assert!(page.error.as_ref().unwrap().contains("UTF-8"));
}

#[tokio::test]
async fn test_latin1_body_is_decoded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // "café " followed by a link, encoded as ISO-8859-1
    let mut body = vec![0x63, 0x61, 0x66, 0xe9, 0x20];
    body.extend_from_slice(format!("{}/next", base_url).as_bytes());
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain; charset=iso-8859-1"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/next", "done".to_string(), 1).await;

    let config = create_test_config(&format!("{}/", base_url), 2, 2);
    let report = run_crawl(&config, deadline_in(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.fetch_errors, 0);
}

#[tokio::test]
async fn test_unreachable_seed() {
    // Bind and drop to get a port with nothing listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let seed = format!("http://127.0.0.1:{}/", port);

    let report = run_crawl(
        &create_test_config(&seed, 1, 1),
        deadline_in(Duration::from_secs(10)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.page(&seed).unwrap().state, PageState::Unreachable);
}

#[tokio::test]
async fn test_html_extractor_resolves_relative_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r##"<html><body>
            <a href="/about">About</a>
            <a href="docs/intro#part-2">Intro</a>
            <a href="mailto:team@example.com">Mail</a>
            <a href="#top">Top</a>
        </body></html>"##
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/about", "<p>About us</p>".to_string(), 1).await;
    mount_page(&mock_server, "/docs/intro", "<p>Intro</p>".to_string(), 1).await;

    let mut config = create_test_config(&format!("{}/", base_url), 2, 2);
    config.crawler.extractor = ExtractorKind::Html;

    let report = run_crawl(&config, deadline_in(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.stats.pages_fetched, 3);
    assert!(report.page(&format!("{}/docs/intro", base_url)).is_some());
}

#[tokio::test]
async fn test_deadline_cuts_slow_crawl_short() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("never seen")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", mock_server.uri());
    let config = create_test_config(&seed, 2, 2);

    let started = std::time::Instant::now();
    let report = run_crawl(&config, deadline_in(Duration::from_millis(200)), CancellationToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.status, RunStatus::TimedOut);
    assert_eq!(report.stats.pages_fetched, 0);
    assert_eq!(report.page(&seed).unwrap().state, PageState::Cancelled);
}

#[tokio::test]
async fn test_markdown_summary_after_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", format!("{}/gone", base_url), 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", base_url), 2, 2);
    let report = run_crawl(&config, deadline_in(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("summary.md");
    generate_markdown_summary(&report, &summary_path).unwrap();

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("- **Status**: completed"));
    assert!(summary.contains("## Failed Pages"));
    assert!(summary.contains(&format!("{}/gone", base_url)));
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_crawling() {
    let config = create_test_config("", 3, 3);
    let result = run_crawl(&config, deadline_in(Duration::from_secs(1)), CancellationToken::new()).await;
    assert!(result.is_err());
}
