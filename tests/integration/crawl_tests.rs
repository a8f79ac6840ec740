//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! plain HTTP fetch strategy through full crawl runs end-to-end.

use link_ripple::config::Config;
use link_ripple::crawler::{CrawlEngine, FetchMode, LinkOutcome};
use link_ripple::output::{to_json, CrawlStatistics};
use link_ripple::RippleError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an engine that never launches a browser
async fn http_engine() -> CrawlEngine {
    let mut config = Config::default();
    config.browser.enabled = false;
    config.http.timeout_secs = 5;

    let engine = CrawlEngine::new(&config)
        .await
        .expect("Failed to build engine");
    assert_eq!(engine.mode(), FetchMode::Http);
    engine
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn find<'a>(outcomes: &'a [LinkOutcome], url: &str) -> &'a LinkOutcome {
    outcomes
        .iter()
        .find(|o| o.url == url)
        .unwrap_or_else(|| panic!("no outcome for {}", url))
}

#[tokio::test]
async fn test_seed_and_direct_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{0}/page1">One</a><a href="/page2">Two</a>"#, base),
    )
    .await;
    mount_page(&server, "/page1", "<p>first</p>").await;
    mount_page(&server, "/page2", "<p>second</p>").await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 1).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 3);

    let seed_url = format!("{}/", base);
    let seed = find(&outcomes, &seed_url);
    assert_eq!(seed.depth, 0);
    assert_eq!(seed.status_code, 200);
    assert!(seed.is_working);
    assert!(seed.parent_url.is_none());
    assert!(seed.error.is_none());

    for page in ["page1", "page2"] {
        let outcome = find(&outcomes, &format!("{}/{}", base, page));
        assert_eq!(outcome.depth, 1);
        assert_eq!(outcome.parent_url.as_deref(), Some(seed_url.as_str()));
        assert!(outcome.is_working);
    }

    engine.close().await.unwrap();
}

#[tokio::test]
async fn test_back_links_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">A</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/">Home</a><a href="/b">B</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/">Home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 4).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 3);
    assert_eq!(find(&outcomes, &format!("{}/b", base)).depth, 2);
}

#[tokio::test]
async fn test_broken_links_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/error">Error</a><a href="http://127.0.0.1:9/">Down</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 1).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 4);

    let missing = find(&outcomes, &format!("{}/missing", base));
    assert_eq!(missing.status_code, 404);
    assert!(!missing.is_working);
    assert!(missing.error.is_none());

    let error = find(&outcomes, &format!("{}/error", base));
    assert_eq!(error.status_code, 500);
    assert!(!error.is_working);

    let down = find(&outcomes, "http://127.0.0.1:9/");
    assert_eq!(down.status_code, 0);
    assert!(!down.is_working);
    assert!(down.error.is_some());

    let stats = CrawlStatistics::from_outcomes(&outcomes);
    assert_eq!(stats.working_links, 1);
    assert_eq!(stats.broken_links, 3);
    assert_eq!(stats.unreachable_links, 1);
}

#[tokio::test]
async fn test_depth_zero_checks_only_seed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/child">Child</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 0).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].depth, 0);
}

#[tokio::test]
async fn test_links_beyond_max_depth_not_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/one">1</a>"#).await;
    mount_page(&server, "/one", r#"<a href="/two">2</a>"#).await;
    mount_page(&server, "/two", r#"<a href="/three">3</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 2).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.depth <= 2));
    assert_eq!(find(&outcomes, &format!("{}/two", base)).depth, 2);
}

#[tokio::test]
async fn test_non_html_pages_not_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/data.json">Data</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"html": "<a href=\"/hidden\">x</a>"}"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 3).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 2);
    assert!(find(&outcomes, &format!("{}/data.json", base)).is_working);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/shared">1</a><a href="/shared">2</a><a href="/other">3</a>
           <link rel="stylesheet" href="/shared">"#,
    )
    .await;
    mount_page(&server, "/other", r#"<a href="/shared">again</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html(""))
        .expect(1)
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 2).await.expect("Crawl failed");

    let shared = format!("{}/shared", base);
    assert_eq!(outcomes.iter().filter(|o| o.url == shared).count(), 1);
    assert_eq!(outcomes.len(), 3);
}

#[tokio::test]
async fn test_relative_links_resolved_against_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs/index.html",
        r#"<a href="guide.html">Guide</a><a href="../about#team">About</a>"#,
    )
    .await;
    mount_page(&server, "/docs/guide.html", "").await;
    mount_page(&server, "/about", "").await;

    let engine = http_engine().await;
    let outcomes = engine
        .check_links(&format!("{}/docs/index.html", base), 1)
        .await
        .expect("Crawl failed");

    assert_eq!(outcomes.len(), 3);
    assert!(find(&outcomes, &format!("{}/docs/guide.html", base)).is_working);
    assert!(find(&outcomes, &format!("{}/about#team", base)).is_working);
}

#[tokio::test]
async fn test_relative_links_resolved_after_redirect() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new/", base).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/new/", r#"<a href="child">Child</a>"#).await;
    mount_page(&server, "/new/child", "").await;

    let engine = http_engine().await;
    let outcomes = engine
        .check_links(&format!("{}/old", base), 1)
        .await
        .expect("Crawl failed");

    let seed = find(&outcomes, &format!("{}/old", base));
    assert_eq!(seed.status_code, 200);
    assert!(find(&outcomes, &format!("{}/new/child", base)).is_working);
}

#[tokio::test]
async fn test_non_navigable_references_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="mailto:someone@example.com">Mail</a>
           <a href="javascript:void(0)">JS</a>
           <a href="tel:+15550100">Call</a>
           <a href="">Empty</a>
           <a href="/real">Real</a>"#,
    )
    .await;
    mount_page(&server, "/real", "").await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 1).await.expect("Crawl failed");

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|o| o.url.starts_with("http://") && !o.url.contains("mailto")));
}

#[tokio::test]
async fn test_engine_reused_across_runs() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(""))
        .expect(2)
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let first = engine.check_links(&base, 1).await.expect("First crawl failed");
    let second = engine.check_links(&base, 1).await.expect("Second crawl failed");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    engine.close().await.unwrap();
    engine.close().await.unwrap();
}

#[tokio::test]
async fn test_invalid_requests_rejected() {
    let engine = http_engine().await;

    for (url, depth) in [
        ("", 1),
        ("not a url", 1),
        ("ftp://example.com/", 1),
        ("/relative/path", 1),
        ("https://example.com/", 5),
    ] {
        let result = engine.check_links(url, depth).await;
        assert!(
            matches!(result, Err(RippleError::InvalidRequest(_))),
            "expected rejection for {:?} at depth {}",
            url,
            depth
        );
    }
}

#[tokio::test]
async fn test_json_report_of_real_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = http_engine().await;
    let outcomes = engine.check_links(&base, 1).await.expect("Crawl failed");

    let json = to_json(&outcomes).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let gone = entries
        .iter()
        .find(|e| e["url"] == format!("{}/gone", base))
        .unwrap();
    assert_eq!(gone["status_code"], 404);
    assert_eq!(gone["is_working"], false);
    assert_eq!(gone["depth"], 1);
    assert_eq!(gone["parent_url"], format!("{}/", base));
    assert!(gone["response_time"].as_str().is_some());
    assert!(gone["last_checked"].as_str().is_some());
}
