//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use arachnid::config::CrawlerConfig;
use arachnid::crawler::{CrawlState, Crawler, ReqwestTransport};
use arachnid::output::{CrawlStatus, DomainData};
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `set_body_string` pins the mime to text/plain, so HTML goes through `set_body_raw`
fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// `127.0.0.1:PORT`, the key pages are grouped under
fn netloc(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

async fn run_crawl(server: &MockServer, config: CrawlerConfig) -> DomainData {
    let transport = Arc::new(ReqwestTransport::new().expect("Failed to build transport"));
    let mut crawler = Crawler::new(&format!("{}/", server.uri()), config, transport)
        .await
        .expect("Failed to create crawler");
    crawler.run().await;
    assert_eq!(crawler.state(), CrawlState::Finished);
    crawler.into_output()
}

fn page_paths(data: &DomainData, netloc: &str) -> Vec<String> {
    data.pages()
        .get(netloc)
        .map(|pages| pages.iter().map(|p| p.path.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="page2">Page 2</a>
            <a href="/files/report.pdf">Report</a>
            <a href="https://elsewhere.example.org/">Out of scope</a>
            <p>Contact: sales@example.com</p>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body>
        <a href="/">Home</a><p>Call +1 (555) 010-2000</p>
        <a href="https://github.com/example-org">GitHub</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><a href="/page1">again</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4 fake".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let data = run_crawl(&mock_server, CrawlerConfig::default()).await;
    let netloc = netloc(&mock_server);

    assert_eq!(data.domain(), netloc);
    assert_eq!(data.status(), CrawlStatus::Finished);
    assert_eq!(page_paths(&data, &netloc), ["/", "/page1", "/page2"]);

    let titles: Vec<&str> = data.pages()[&netloc].iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Home", "Page 1", "Page 2"]);

    let documents = &data.documents()[&netloc];
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].path, "/files/report.pdf");
    assert_eq!(documents[0].extension, "pdf");

    assert!(data.emails().contains("sales@example.com"));
    assert!(data.phones().contains("+1 (555) 010-2000"));
    assert!(data.socials().contains("https://github.com/example-org"));
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let mock_server = MockServer::start().await;

    mount_robots(
        &mock_server,
        "User-agent: *\nDisallow: /private/\nDisallow: /hidden/",
    )
    .await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/private/keys">keys</a><a href="/public">public</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "<title>Public</title>").await;
    Mock::given(method("GET"))
        .and(path("/private/keys"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden/"))
        .respond_with(html("hidden"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let data = run_crawl(&mock_server, CrawlerConfig::default()).await;
    assert_eq!(page_paths(&data, &netloc(&mock_server)), ["/", "/public"]);
}

#[tokio::test]
async fn test_ignored_robots_are_crawled_and_flagged() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "User-agent: *\nDisallow: /hidden/").await;
    mount_page(&mock_server, "/", r#"<a href="/hidden/admin">admin</a>"#).await;
    mount_page(&mock_server, "/hidden/", "<title>Hidden index</title>").await;
    mount_page(&mock_server, "/hidden/admin", "<title>Admin</title>").await;

    let config = CrawlerConfig {
        obey_robots: false,
        ..CrawlerConfig::default()
    };
    let data = run_crawl(&mock_server, config).await;
    let netloc = netloc(&mock_server);

    // The mined Disallow path is queued right after the seed
    assert_eq!(page_paths(&data, &netloc), ["/", "/hidden/", "/hidden/admin"]);

    let pages = &data.pages()[&netloc];
    assert!(!pages[0].on_robots);
    assert!(pages[1].on_robots);
    assert!(pages[2].on_robots);
}

#[tokio::test]
async fn test_unreachable_links_do_not_stop_the_crawl() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    // Same host, closed port: in scope but unreachable
    mount_page(
        &mock_server,
        "/",
        r#"<a href="http://127.0.0.1:1/down">down</a><a href="/up">up</a>"#,
    )
    .await;
    mount_page(&mock_server, "/up", "<title>Up</title>").await;

    let data = run_crawl(&mock_server, CrawlerConfig::default()).await;
    assert_eq!(page_paths(&data, &netloc(&mock_server)), ["/", "/up"]);
    assert!(!data.pages().contains_key("127.0.0.1:1"));
}

#[tokio::test]
async fn test_error_status_pages_are_recorded() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/", r#"<a href="/broken">broken</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_raw("<title>Oops</title><p>ops@example.com</p>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let data = run_crawl(&mock_server, CrawlerConfig::default()).await;
    let pages = &data.pages()[&netloc(&mock_server)];
    assert_eq!(pages[1].path, "/broken");
    assert_eq!(pages[1].code, 500);
    assert!(data.emails().contains("ops@example.com"));
}

#[tokio::test]
async fn test_path_fuzzing_finds_unlinked_pages() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", "<title>Home</title>").await;
    mount_page(&mock_server, "/admin", "<title>Admin</title>").await;

    let mut words = tempfile::NamedTempFile::new().unwrap();
    writeln!(words, "# test list\nadmin\nbackup").unwrap();
    words.flush().unwrap();

    let config = CrawlerConfig {
        fuzz_paths: true,
        paths_list_file: Some(words.path().to_path_buf()),
        ..CrawlerConfig::default()
    };
    let data = run_crawl(&mock_server, config).await;
    let pages = &data.pages()[&netloc(&mock_server)];

    // /backup answers wiremock's bare 404 with no content type and is not recorded
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].path, "/admin");
    assert!(pages[1].on_fuzz_list);
    assert!(!pages[0].on_fuzz_list);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">a</a><a href="/a#frag">a again</a><a href="/b">b</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/b">b</a><a href="/">home</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(r#"<a href="/a">a</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let data = run_crawl(&mock_server, CrawlerConfig::default()).await;
    assert_eq!(page_paths(&data, &netloc(&mock_server)), ["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_report_is_valid_json() {
    let mock_server = MockServer::start().await;

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", "<title>Home</title><p>hello@example.com</p>").await;

    let data = run_crawl(&mock_server, CrawlerConfig::default()).await;
    let json: serde_json::Value =
        serde_json::from_str(&data.dumps(true).expect("Failed to render report"))
            .expect("Report is not valid JSON");

    assert_eq!(json["status"], "finished");
    assert_eq!(json["emails"][0], "hello@example.com");
    assert!(json["started_at"].is_string());
    assert!(json["finished_at"].is_string());
    assert_eq!(json["config"]["obey-robots"], true);
}
