//! Integration tests for menu source monitoring
//!
//! A wiremock server plays the restaurant website; sources and reviews live in
//! a SQLite database and baselines in a directory, both under a tempdir.

use async_trait::async_trait;
use menu_scout::clock::SystemClock;
use menu_scout::config::Config;
use menu_scout::crawler::{HttpTransport, ReqwestTransport};
use menu_scout::monitor::{
    CheckOutcome, PdfTextError, PdfTextExtractor, SourceMonitor, SweepStats,
};
use menu_scout::robots::{RobotsCache, RobotsGate, RobotsSettings};
use menu_scout::storage::{
    BaselineStore, DiffStatus, FsBaselineStore, SourceStore, SourceType, SqliteStore,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stands in for pdftotext: test PDFs are plain UTF-8
struct PlainTextPdf;

#[async_trait]
impl PdfTextExtractor for PlainTextPdf {
    async fn extract_text(&self, path: &Path) -> Result<String, PdfTextError> {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

struct Setup {
    monitor: SourceMonitor,
    dir: TempDir,
}

fn setup() -> Setup {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.storage.database_path = dir.path().join("sources.db").display().to_string();
    config.storage.baseline_dir = dir.path().join("baselines").display().to_string();

    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(&config.user_agent).expect("Failed to build transport"));
    let cache = RobotsCache::new(chrono::Duration::hours(1), Arc::new(SystemClock));
    let robots = Arc::new(RobotsGate::new(
        transport.clone(),
        RobotsSettings::from_config(&config),
        cache,
    ));

    let store = SqliteStore::open(Path::new(&config.storage.database_path)).unwrap();
    let baselines = FsBaselineStore::new(&config.storage.baseline_dir).unwrap();

    let monitor = SourceMonitor::new(
        &config,
        transport,
        robots,
        Box::new(store),
        Box::new(baselines),
        Arc::new(PlainTextPdf),
    );
    Setup { monitor, dir }
}

async fn serve_pdf(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(server)
        .await;
}

fn latest_report(monitor: &SourceMonitor, review_id: i64) -> String {
    monitor
        .store()
        .get_review(review_id)
        .unwrap()
        .diff_content
        .unwrap_or_default()
}

#[tokio::test]
async fn test_pdf_source_lifecycle() {
    let server = MockServer::start().await;
    let mut s = setup();
    let url = format!("{}/files/menu.pdf", server.uri());
    let id = s
        .monitor
        .store_mut()
        .insert_source(&url, SourceType::Pdf)
        .unwrap();

    serve_pdf(&server, "/files/menu.pdf", "Starters\nSoup 4\nSalad 6\n").await;

    // First sight: everything is new, the PDF becomes the baseline
    let stats = s.monitor.sweep().await.unwrap();
    assert_eq!(
        stats,
        SweepStats {
            checked: 1,
            changed: 1,
            diff_complete: 1,
            ..Default::default()
        }
    );

    let baselines = FsBaselineStore::new(s.dir.path().join("baselines")).unwrap();
    assert_eq!(
        baselines.load(id, SourceType::Pdf).unwrap().as_deref(),
        Some(&b"Starters\nSoup 4\nSalad 6\n"[..])
    );

    // Same bytes: cheap tier stops, no review
    let stats = s.monitor.sweep().await.unwrap();
    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.changed, 0);

    // New edition of the menu
    server.reset().await;
    serve_pdf(&server, "/files/menu.pdf", "Starters\nSalad 6\nTart 7\n").await;

    let CheckOutcome::Changed { review_id } = s.monitor.check_source(id).await.unwrap() else {
        panic!("expected a change");
    };
    assert_eq!(
        s.monitor.diff_review(review_id).await.unwrap(),
        DiffStatus::DiffComplete
    );

    let report = latest_report(&s.monitor, review_id);
    assert!(report.starts_with("--- Previous version (3 lines)\n+++ New version (3 lines)"));
    assert!(report.contains("REMOVED (1 lines):\n- Soup 4"));
    assert!(report.contains("ADDED (1 lines):\n+ Tart 7"));
    assert_eq!(
        baselines.load(id, SourceType::Pdf).unwrap().as_deref(),
        Some(&b"Starters\nSalad 6\nTart 7\n"[..])
    );
}

#[tokio::test]
async fn test_etag_revalidation() {
    let server = MockServer::start().await;
    let mut s = setup();
    let url = format!("{}/menu.pdf", server.uri());
    let id = s
        .monitor
        .store_mut()
        .insert_source(&url, SourceType::Pdf)
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/menu.pdf"))
        .and(header("if-none-match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/menu.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Soup 4")
                .insert_header("content-type", "application/pdf")
                .insert_header("etag", "\"v1\""),
        )
        .mount(&server)
        .await;

    assert!(matches!(
        s.monitor.check_source(id).await.unwrap(),
        CheckOutcome::Changed { .. }
    ));
    assert_eq!(
        s.monitor.store().get_source(id).unwrap().etag.as_deref(),
        Some("\"v1\"")
    );

    assert_eq!(
        s.monitor.check_source(id).await.unwrap(),
        CheckOutcome::Unchanged
    );
}

#[tokio::test]
async fn test_html_source_ignores_markup_churn() {
    let server = MockServer::start().await;
    let mut s = setup();
    let url = format!("{}/menu", server.uri());
    let id = s
        .monitor
        .store_mut()
        .insert_source(&url, SourceType::Html)
        .unwrap();

    let page = |nonce: &str| {
        format!(
            r#"<html><head><script nonce="{nonce}">var t = "{nonce}";</script></head>
            <body><h1>Menu</h1><p>Soup 4</p><p>Salad 6</p></body></html>"#
        )
    };

    Mock::given(method("GET"))
        .and(path("/menu"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page("a1"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let CheckOutcome::Changed { review_id } = s.monitor.check_source(id).await.unwrap() else {
        panic!("first check must open a review");
    };
    s.monitor.diff_review(review_id).await.unwrap();
    let report = latest_report(&s.monitor, review_id);
    assert!(report.starts_with("+++ New version (3 lines)"));
    assert!(report.contains("+ Salad 6"));

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/menu"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page("b2"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    assert_eq!(
        s.monitor.check_source(id).await.unwrap(),
        CheckOutcome::Unchanged
    );
}

#[tokio::test]
async fn test_unreachable_source_counts_as_error() {
    let server = MockServer::start().await;
    let mut s = setup();
    s.monitor
        .store_mut()
        .insert_source(&format!("{}/gone.pdf", server.uri()), SourceType::Pdf)
        .unwrap();
    let ok = s
        .monitor
        .store_mut()
        .insert_source(&format!("{}/menu.pdf", server.uri()), SourceType::Pdf)
        .unwrap();
    serve_pdf(&server, "/menu.pdf", "Soup 4").await;

    let stats = s.monitor.sweep().await.unwrap();
    assert_eq!(stats.checked, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.diff_complete, 1);

    // The failing source is still checked and stamped
    let sources = s.monitor.store().list_active_sources().unwrap();
    assert!(sources.iter().all(|source| source.last_checked_at.is_some()));
    assert!(sources
        .iter()
        .find(|source| source.id == ok)
        .is_some_and(|source| source.last_fingerprint.is_some()));
}
