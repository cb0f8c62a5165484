//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the transcript archive and run
//! the full harvest cycle end-to-end into a temporary download directory.

use encoding_rs::WINDOWS_1250;
use std::path::Path;
use steno_harvest::config::{Config, HttpConfig, OutputConfig, ScanConfig, SourceConfig};
use steno_harvest::crawler::harvest;
use steno_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PAGE: &str = r#"<html><body>
    <a href="/eknih/2021ps/index.htm">Poslanecká sněmovna 2021</a>
    <a href="/eknih/1993nr/index.htm">Národní rada</a>
    <a href="/kontakty.htm">Kontakty</a>
</body></html>"#;

/// Creates a test configuration pointing at the mock archive
fn create_test_config(server_uri: &str, download_dir: &Path) -> Config {
    Config {
        source: SourceConfig {
            index_url: format!("{}/eknih/index.htm", server_uri),
            base_url: format!("{}/eknih", server_uri),
        },
        scan: ScanConfig {
            min_content_length: 20,
            max_consecutive_part_errors: 3,
            max_consecutive_session_errors: 3,
        },
        http: HttpConfig {
            request_timeout_secs: 5,
            max_retries: 2,
            backoff_base_ms: 1,
            request_delay_ms: 0,
            user_agent: "TestBot/1.0".to_string(),
        },
        output: OutputConfig {
            download_dir: download_dir.to_string_lossy().to_string(),
            min_file_size_bytes: 10,
        },
        ..Config::default()
    }
}

fn transcript(text: &str) -> Vec<u8> {
    let html = format!("<html><body><p>{}</p></body></html>", text);
    let (bytes, _, _) = WINDOWS_1250.encode(&html);
    bytes.into_owned()
}

/// Mounts the index page and three transcript pages of key `2021ps`
async fn mount_archive(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/eknih/index.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE))
        .mount(server)
        .await;

    let pages = [
        ("/eknih/2021ps/stenprot/001schuz/s001001.htm", "Předseda zahájil schůzi."),
        ("/eknih/2021ps/stenprot/001schuz/s001002.htm", "Poslanec Šťastný má slovo."),
        ("/eknih/2021ps/stenprot/002schuz/s002001.htm", "Druhá schůze byla zahájena."),
    ];

    for (page, text) in pages {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(transcript(text)))
            .mount(server)
            .await;
    }
}

/// Number of requests the server received for `page`
async fn requests_for(server: &MockServer, page: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .filter(|r| r.url.path() == page)
        .count()
}

#[tokio::test]
async fn test_full_harvest_writes_transcripts() {
    let mock_server = MockServer::start().await;
    mount_archive(&mock_server).await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    let config = create_test_config(&mock_server.uri(), dir.path());
    let report = harvest(config).await.expect("Harvest failed");

    assert_eq!(report.total_downloaded(), 3);
    assert_eq!(report.total_store_failures(), 0);

    // 2021ps plus its expanded chamber; the `nr` body is not a key
    let keys: Vec<&str> = report.keys.iter().map(|k| k.key.as_str()).collect();
    assert_eq!(keys, vec!["2021ps/psse", "2021ps"]);

    let first = dir.path().join("2021ps_stenprot_001schuz_s001001.htm");
    let second = dir.path().join("2021ps_stenprot_001schuz_s001002.htm");
    let third = dir.path().join("2021ps_stenprot_002schuz_s002001.htm");
    assert!(first.exists());
    assert!(third.exists());

    // Stored in the archive's own encoding, byte for byte
    let stored = std::fs::read(&second).expect("Failed to read stored page");
    assert_eq!(stored, transcript("Poslanec Šťastný má slovo."));
}

#[tokio::test]
async fn test_second_harvest_skips_stored_pages() {
    let mock_server = MockServer::start().await;
    mount_archive(&mock_server).await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    let first = harvest(create_test_config(&mock_server.uri(), dir.path()))
        .await
        .expect("First harvest failed");
    assert_eq!(first.total_downloaded(), 3);

    let second = harvest(create_test_config(&mock_server.uri(), dir.path()))
        .await
        .expect("Second harvest failed");
    assert_eq!(second.total_downloaded(), 0);
    assert_eq!(second.total_skipped(), 3);

    for page in [
        "/eknih/2021ps/stenprot/001schuz/s001001.htm",
        "/eknih/2021ps/stenprot/001schuz/s001002.htm",
        "/eknih/2021ps/stenprot/002schuz/s002001.htm",
    ] {
        assert_eq!(requests_for(&mock_server, page).await, 1, "{} requested again", page);
    }
}

#[tokio::test]
async fn test_undersized_file_is_purged_and_fetched_again() {
    let mock_server = MockServer::start().await;
    mount_archive(&mock_server).await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    let leftover = dir.path().join("2021ps_stenprot_001schuz_s001001.htm");
    std::fs::write(&leftover, b"err").expect("Failed to write leftover");

    let report = harvest(create_test_config(&mock_server.uri(), dir.path()))
        .await
        .expect("Harvest failed");

    assert_eq!(report.total_downloaded(), 3);
    let stored = std::fs::read(&leftover).expect("Failed to read stored page");
    assert_eq!(stored, transcript("Předseda zahájil schůzi."));
}

#[tokio::test]
async fn test_unreachable_index_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eknih/index.htm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let result = harvest(create_test_config(&mock_server.uri(), dir.path())).await;

    assert!(matches!(result, Err(HarvestError::KeySource { .. })));

    // Nothing beyond the index was requested
    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording is enabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_server_errors_do_not_abort_harvest() {
    let mock_server = MockServer::start().await;
    mount_archive(&mock_server).await;

    // Part 3 of session 1 answers with a server error; the scan counts it as a miss
    Mock::given(method("GET"))
        .and(path("/eknih/2021ps/stenprot/001schuz/s001003.htm"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let report = harvest(create_test_config(&mock_server.uri(), dir.path()))
        .await
        .expect("Harvest failed");

    assert_eq!(report.total_downloaded(), 3);
    // HTTP errors are answers, not network failures, so they are not retried
    assert_eq!(
        requests_for(&mock_server, "/eknih/2021ps/stenprot/001schuz/s001003.htm").await,
        1
    );
}
