//! Integration tests for the crawler and archive builder
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl-and-package cycle end-to-end.

use async_trait::async_trait;
use sitepack::archive::{Archive, ArchiveBuilder};
use sitepack::config::{load_config, AppConfig, Config, CrawlerConfig};
use sitepack::crawler::{
    crawl, AssetStatus, Coordinator, CrawlResult, Fetch, FetchOutcome, FetchRequest, Progress,
};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `website_url` with no proxy
fn create_test_config(website_url: &str) -> Config {
    let mut config = Config::default();
    config.crawler = CrawlerConfig {
        max_concurrent_fetches: 4,
        fetch_timeout_ms: 5_000,
        proxy_url: None,
    };
    config.app = AppConfig {
        app_name: "Test App".to_string(),
        package_name: "com.example.test".to_string(),
        website_url: website_url.to_string(),
        include_all_pages: true,
    };
    config
}

/// Pads markup with trailing whitespace to exactly `len` bytes
fn padded_page(markup: &str, len: usize) -> String {
    assert!(markup.len() <= len);
    format!("{}{}", markup, " ".repeat(len - markup.len()))
}

fn entry_names(archive: &Archive) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(archive.bytes.as_slice())).unwrap();
    zip.file_names().map(str::to_string).collect()
}

fn read_entry(archive: &Archive, name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes.as_slice())).unwrap();
    let mut content = String::new();
    zip.by_name(name).unwrap().read_to_string(&mut content).unwrap();
    content
}

async fn mount(server: &MockServer, route: &str, body: impl Into<Vec<u8>>, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.into())
                .insert_header("content-type", content_type),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_and_package() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());

    let page = padded_page(
        r#"<html><head><link rel="stylesheet" href="/style.css"></head><body><img src="/logo.png"></body></html>"#,
        1000,
    );
    mount(&mock_server, "/", page, "text/html").await;
    mount(&mock_server, "/style.css", vec![b'a'; 500], "text/css").await;
    mount(&mock_server, "/logo.png", vec![0u8; 2000], "image/png").await;

    let config = create_test_config(&base_url);
    let result = crawl(&config, &Progress::disabled()).await.unwrap();

    assert_eq!(result.asset_count(), 3);
    assert_eq!(result.total_size_bytes, 3500);
    assert_eq!(result.page_count, 1);
    assert_eq!(
        result.paths().collect::<Vec<_>>(),
        vec!["index.html", "style.css", "logo.png"]
    );
    assert_eq!(result.count_by_status(AssetStatus::Ok), 3);

    let archive = ArchiveBuilder::new().build(&result, &config.app).unwrap();
    let names = entry_names(&archive);
    for required in [
        "index.html",
        "manifest.json",
        "sw.js",
        "README.md",
        "icon-192.png",
        "icon-512.png",
        "style.css",
        "logo.png",
    ] {
        assert!(names.contains(&required.to_string()), "missing {}", required);
    }
    assert_eq!(archive.total_size_bytes, 3500);
    assert!(read_entry(&archive, "README.md").contains("- **Total Size:** 3.42 KB"));
    assert!(read_entry(&archive, "index.html").contains(r#"<link rel="stylesheet" href="/style.css">"#));
}

#[tokio::test]
async fn test_seed_not_found_produces_fallback() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url);
    let result = crawl(&config, &Progress::disabled()).await.unwrap();

    assert_eq!(result.page_count, 1);
    assert_eq!(result.asset_count(), 1);
    let page = result.get("index.html").unwrap();
    assert_eq!(page.status, AssetStatus::Fallback);
    assert_eq!(result.total_size_bytes, page.size_bytes);
    assert!(String::from_utf8_lossy(&page.content).contains("<iframe"));
}

#[tokio::test]
async fn test_missing_asset_archived_as_placeholder() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());

    mount(
        &mock_server,
        "/",
        r#"<html><head><script src="/missing.js"></script></head></html>"#,
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.js"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url);
    let result = crawl(&config, &Progress::disabled()).await.unwrap();

    let asset = result.get("missing.js").unwrap();
    assert_eq!(asset.status, AssetStatus::Placeholder);

    let archive = ArchiveBuilder::new().build(&result, &config.app).unwrap();
    assert_eq!(
        read_entry(&archive, "missing.js"),
        format!("/* Failed to load asset: {}missing.js */", base_url)
    );
}

#[tokio::test]
async fn test_cross_origin_asset_goes_through_proxy() {
    let mock_server = MockServer::start().await;
    let proxy_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());

    mount(
        &mock_server,
        "/",
        r#"<html><head><script src="https://cdn.example.net/lib.js"></script></head></html>"#,
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param("url", "https://cdn.example.net/lib.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("console.log(1);"))
        .expect(1)
        .mount(&proxy_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.proxy_url = Some(format!("{}/raw?url=", proxy_server.uri()));

    let result = crawl(&config, &Progress::disabled()).await.unwrap();

    let asset = result.get("lib.js").unwrap();
    assert_eq!(asset.status, AssetStatus::Ok);
    assert_eq!(asset.content, b"console.log(1);");
}

#[tokio::test]
async fn test_progress_stream_through_package() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());

    mount(
        &mock_server,
        "/",
        r#"<html><head><link rel="stylesheet" href="/a.css"></head></html>"#,
        "text/html",
    )
    .await;
    mount(&mock_server, "/a.css", "a{}", "text/css").await;

    let config = create_test_config(&base_url);
    let (progress, mut rx) = Progress::channel();

    let result = crawl(&config, &progress).await.unwrap();
    ArchiveBuilder::new()
        .progress(progress)
        .build(&result, &config.app)
        .unwrap();

    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }

    assert_eq!(messages.first().map(String::as_str), Some("Starting website crawl..."));
    assert!(messages.contains(&format!("Crawling: {}", base_url)));
    assert!(messages.contains(&format!("Downloading: {}a.css", base_url)));
    assert!(messages.contains(&"Processing downloaded content...".to_string()));
    assert_eq!(messages.last().map(String::as_str), Some("Generating ZIP file..."));
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());
    mount(&mock_server, "/", "<html><body>hello</body></html>", "text/html").await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
max-concurrent-fetches = 2
proxy-url = ""

[app]
app-name = "File App"
website-url = "{}"
"#,
        base_url
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let result = crawl(&config, &Progress::disabled()).await.unwrap();

    assert_eq!(result.asset_count(), 1);
    assert_eq!(Archive::suggested_filename(&config.app.app_name), "File_App_website.zip");
}

/// Serves canned responses and counts every fetch
struct CountingFetcher {
    responses: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

#[async_trait]
impl Fetch for CountingFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(&request.url) {
            Some(body) => FetchOutcome::Ok {
                bytes: body.clone(),
                content_type: None,
            },
            None => FetchOutcome::Failed(sitepack::crawler::FetchFailure::Status(404)),
        }
    }
}

fn counting_fetcher() -> Arc<CountingFetcher> {
    let page = r#"<html><head>
        <link rel="stylesheet" href="/css/site.css">
        <link rel="stylesheet" href="css/site.css">
        <script src="/js/app.js"></script>
        <img src="/img/logo.png"><img src="/img/logo.png">
        </head></html>"#;

    let responses = [
        ("https://example.com/", page.as_bytes().to_vec()),
        ("https://example.com/css/site.css", b"body{}".to_vec()),
        ("https://example.com/js/app.js", b"run()".to_vec()),
        ("https://example.com/img/logo.png", vec![1, 2, 3]),
    ]
    .into_iter()
    .map(|(url, body)| (url.to_string(), body))
    .collect();

    Arc::new(CountingFetcher {
        responses,
        calls: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn test_duplicate_references_fetched_once() {
    let fetcher = counting_fetcher();
    let coordinator = Coordinator::new(Arc::clone(&fetcher), &CrawlerConfig::default());

    let result = coordinator
        .crawl("https://example.com/", &Progress::disabled())
        .await
        .unwrap();

    // Seed page plus three distinct assets
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    assert_eq!(result.asset_count(), 4);
    let sum: u64 = result.assets.values().map(|a| a.size_bytes).sum();
    assert_eq!(result.total_size_bytes, sum);
}

#[tokio::test]
async fn test_repeated_crawls_are_identical() {
    let fetcher = counting_fetcher();
    let coordinator = Coordinator::new(Arc::clone(&fetcher), &CrawlerConfig::default());

    let first: CrawlResult = coordinator
        .crawl("https://example.com/", &Progress::disabled())
        .await
        .unwrap();
    let second: CrawlResult = coordinator
        .crawl("https://example.com/", &Progress::disabled())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.paths().collect::<Vec<_>>(),
        vec!["index.html", "css/site.css", "js/app.js", "img/logo.png"]
    );

    let app = create_test_config("https://example.com/").app;
    let generated_at = chrono::Utc::now();
    let first_archive = ArchiveBuilder::new().generated_at(generated_at).build(&first, &app).unwrap();
    let second_archive = ArchiveBuilder::new().generated_at(generated_at).build(&second, &app).unwrap();
    assert_eq!(first_archive.sha256(), second_archive.sha256());
}
