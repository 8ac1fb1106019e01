//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small shop (listing pages, product
//! pages, and images) and run the full harvest cycle end-to-end.

use gallery_harvest::browser::{build_http_client, HttpBrowser, PageSelectors};
use gallery_harvest::config::{Config, PageFailurePolicy, UserAgentConfig};
use gallery_harvest::harvest::{
    run_harvest, AssetDownloader, EventLog, HarvestEvent, HarvestSettings, Orchestrator,
};
use gallery_harvest::{CrawlStats, RunOutcome};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMPTY_PAGE: &str = "<html><body><p>Nothing here</p></body></html>";

/// Builds listing markup with one `.item` entry per href
fn listing_html(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| format!(r#"<div class="item"><a href="{}">product</a></div>"#, href))
        .collect();
    format!("<html><body>{}</body></html>", items)
}

/// Builds product markup with one `<picture>` per image source
fn product_html(sources: &[&str]) -> String {
    let pictures: String = sources
        .iter()
        .map(|src| format!(r#"<picture><img src="{}"></picture>"#, src))
        .collect();
    format!("<html><body><h1>Product</h1>{}</body></html>", pictures)
}

async fn mount_listing_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, route: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// Runs an orchestrator over the real HTTP engine with short timeouts
async fn harvest(
    base_url: &str,
    output_dir: &Path,
    max_pages: u32,
    policy: PageFailurePolicy,
) -> (CrawlStats, EventLog) {
    let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5))
        .expect("Failed to build client");
    let settings = HarvestSettings {
        selectors: PageSelectors::new(".item", "picture").expect("Invalid selectors"),
        render_timeout: Duration::from_millis(300),
        download_delay: Duration::ZERO,
        page_failure_policy: policy,
        max_run_duration: None,
    };
    let log = EventLog::new();

    let stats = Orchestrator::new(
        HttpBrowser::new(client.clone(), Duration::from_millis(50)),
        AssetDownloader::new(client),
        settings,
    )
    .with_event_sink(Arc::new(log.clone()))
    .run(base_url, output_dir, max_pages)
    .await;

    (stats, log)
}

#[tokio::test]
async fn test_full_harvest_from_config() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = output.path().join("images");

    mount_listing_page(
        &server,
        "1",
        listing_html(&["/product/dkp-100/red-chair", "/product/dkp-200/sold-out"]),
    )
    .await;
    mount_listing_page(&server, "2", EMPTY_PAGE.to_string()).await;
    mount_page(
        &server,
        "/product/dkp-100/red-chair",
        product_html(&["/img/front.jpg", "/img/side.jpg", "/img/back.jpg"]),
    )
    .await;
    mount_page(&server, "/product/dkp-200/sold-out", EMPTY_PAGE.to_string()).await;
    mount_image(&server, "/img/front.jpg", b"front").await;
    mount_image(&server, "/img/side.jpg", b"side").await;
    mount_image(&server, "/img/back.jpg", b"back").await;

    let mut config = Config::default();
    config.crawler.target_url = Some(format!("{}/list?", server.uri()));
    config.crawler.max_pages = 5;
    config.crawler.render_timeout_seconds = 1;
    config.crawler.poll_interval_ms = 50;
    config.crawler.download_delay_ms = 0;
    config.selectors.listing_item = ".item".to_string();
    config.output.output_dir = output_dir.clone();

    let stats = run_harvest(&config, Arc::new(AtomicBool::new(false)))
        .await
        .expect("Harvest failed");

    assert_eq!(stats.outcome, Some(RunOutcome::EndOfListing { page: 2 }));
    assert!(!stats.is_failure());
    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.items_processed, 2);
    assert_eq!(stats.assets_saved, 3);
    assert_eq!(stats.assets_failed, 0);
    assert!(stats.finished_at.is_some());

    let front = std::fs::read(output_dir.join("dkp-100_red-chair_1.jpg")).unwrap();
    let side = std::fs::read(output_dir.join("dkp-100_red-chair_2.jpg")).unwrap();
    let back = std::fs::read(output_dir.join("dkp-100_red-chair_3.jpg")).unwrap();
    assert_eq!(front, b"front");
    assert_eq!(side, b"side");
    assert_eq!(back, b"back");

    // Nothing else was written, and no temporary files were left behind
    let written = std::fs::read_dir(&output_dir).unwrap().count();
    assert_eq!(written, 3);
}

#[tokio::test]
async fn test_product_without_media_is_reported() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_listing_page(&server, "1", listing_html(&["/product/dkp-200/sold-out"])).await;
    mount_listing_page(&server, "2", EMPTY_PAGE.to_string()).await;
    mount_page(&server, "/product/dkp-200/sold-out", EMPTY_PAGE.to_string()).await;

    let base_url = format!("{}/list?", server.uri());
    let (stats, log) = harvest(&base_url, output.path(), 10, PageFailurePolicy::Abort).await;

    assert_eq!(stats.items_processed, 1);
    assert_eq!(stats.assets_saved, 0);
    assert_eq!(log.count("no_media"), 1);
    assert!(log.events().iter().any(|event| matches!(
        event,
        HarvestEvent::NoMedia { item_id, .. } if item_id == "dkp-200"
    )));
}

#[tokio::test]
async fn test_page_ceiling_stops_before_next_page() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_listing_page(&server, "1", listing_html(&["/product/dkp-1/lamp"])).await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[
            "/product/dkp-2/desk",
        ])))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/product/dkp-1/lamp", product_html(&["/img/lamp.jpg"])).await;
    mount_image(&server, "/img/lamp.jpg", b"lamp").await;

    let base_url = format!("{}/list?", server.uri());
    let (stats, _) = harvest(&base_url, output.path(), 1, PageFailurePolicy::Abort).await;

    assert_eq!(stats.outcome, Some(RunOutcome::PageCeiling { max_pages: 1 }));
    assert!(!stats.is_failure());
    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.assets_saved, 1);
    assert!(output.path().join("dkp-1_lamp_1.jpg").exists());
}

#[tokio::test]
async fn test_failed_image_does_not_stop_the_rest() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_listing_page(&server, "1", listing_html(&["/product/dkp-5/sofa"])).await;
    mount_listing_page(&server, "2", EMPTY_PAGE.to_string()).await;
    mount_page(
        &server,
        "/product/dkp-5/sofa",
        product_html(&[
            "/img/one.jpg",
            "http://127.0.0.1:1/unreachable.jpg",
            "/img/three.jpg",
        ]),
    )
    .await;
    mount_image(&server, "/img/one.jpg", b"one").await;
    mount_image(&server, "/img/three.jpg", b"three").await;

    let base_url = format!("{}/list?", server.uri());
    let (stats, log) = harvest(&base_url, output.path(), 10, PageFailurePolicy::Abort).await;

    assert!(!stats.is_failure());
    assert_eq!(stats.assets_saved, 2);
    assert_eq!(stats.assets_failed, 1);
    assert_eq!(stats.items_failed, 0);
    assert_eq!(log.count("asset_failed"), 1);

    // Ordinals follow document order, failures included
    assert!(output.path().join("dkp-5_sofa_1.jpg").exists());
    assert!(!output.path().join("dkp-5_sofa_2.jpg").exists());
    assert!(output.path().join("dkp-5_sofa_3.jpg").exists());
}

#[tokio::test]
async fn test_unreachable_product_page_is_isolated() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_listing_page(
        &server,
        "1",
        listing_html(&["/product/dkp-1/gone", "/product/dkp-2/here"]),
    )
    .await;
    mount_listing_page(&server, "2", EMPTY_PAGE.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/product/dkp-1/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/product/dkp-2/here", product_html(&["/img/here.jpg"])).await;
    mount_image(&server, "/img/here.jpg", b"here").await;

    let base_url = format!("{}/list?", server.uri());
    let (stats, _) = harvest(&base_url, output.path(), 10, PageFailurePolicy::Abort).await;

    assert_eq!(stats.outcome, Some(RunOutcome::EndOfListing { page: 2 }));
    assert_eq!(stats.items_processed, 2);
    assert_eq!(stats.items_failed, 1);
    assert_eq!(stats.assets_saved, 1);
    assert!(output.path().join("dkp-2_here_1.jpg").exists());
}

#[tokio::test]
async fn test_listing_load_failure_fails_the_run() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let base_url = format!("{}/list?", server.uri());
    let (stats, log) = harvest(&base_url, output.path(), 10, PageFailurePolicy::Abort).await;

    assert!(matches!(
        stats.outcome,
        Some(RunOutcome::PageLoadFailure { page: 1, .. })
    ));
    assert!(stats.is_failure());
    assert_eq!(stats.pages_visited, 0);
    assert_eq!(log.count("page_load_failed"), 1);
}

#[tokio::test]
async fn test_skip_page_policy_moves_on() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_listing_page(&server, "2", listing_html(&["/product/dkp-9/rug"])).await;
    mount_listing_page(&server, "3", EMPTY_PAGE.to_string()).await;
    mount_page(&server, "/product/dkp-9/rug", product_html(&["/img/rug.jpg"])).await;
    mount_image(&server, "/img/rug.jpg", b"rug").await;

    let base_url = format!("{}/list?", server.uri());
    let (stats, _) = harvest(&base_url, output.path(), 10, PageFailurePolicy::SkipPage).await;

    assert_eq!(stats.outcome, Some(RunOutcome::EndOfListing { page: 3 }));
    assert!(!stats.is_failure());
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.assets_saved, 1);
}
