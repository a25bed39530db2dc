//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run discovery,
//! extraction and contact mining end-to-end over the real reqwest transport.

use menu_scout::clock::SystemClock;
use menu_scout::config::Config;
use menu_scout::crawler::{
    CrawlFrontier, CrawlTarget, HttpTransport, LinkPolicy, PageFetcher, PdfFetcher,
    ReqwestTransport,
};
use menu_scout::extract::Page;
use menu_scout::robots::{RobotsCache, RobotsGate, RobotsSettings, RobotsStatus};
use menu_scout::{ContactInfoMiner, MenuFinder, MenuScraper};
use std::io::Read;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Crawler {
    robots: Arc<RobotsGate>,
    pages: PageFetcher,
    pdfs: PdfFetcher,
}

fn crawler() -> Crawler {
    let config = Config::default();
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(&config.user_agent).expect("Failed to build transport"));
    let cache = RobotsCache::new(chrono::Duration::hours(1), Arc::new(SystemClock));
    let robots = Arc::new(RobotsGate::new(
        transport.clone(),
        RobotsSettings::from_config(&config),
        cache,
    ));

    Crawler {
        pages: PageFetcher::from_config(&config, transport.clone(), robots.clone()),
        pdfs: PdfFetcher::from_config(&config, transport, robots.clone()),
        robots,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

const MENU_PAGE: &str = r#"<html><body>
    <nav><a href="/">Home</a></nav>
    <div class="menu-section">
      <h2>Starters</h2>
      <ul>
        <li>Tomato soup with basil oil €6.50</li>
        <li>Burrata, heirloom tomatoes €11.00</li>
        <li>Fried calamari, lemon aioli €9.50</li>
      </ul>
    </div>
    </body></html>"#;

#[tokio::test]
async fn test_menu_discovery_and_scrape() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/menu">Our menu</a>
        <a href="/files/dinner.pdf">Dinner (PDF)</a>
        <a href="/gallery">Gallery</a>
        <a href="mailto:hello@bistro.example">Mail</a>
        <a href="https://elsewhere.example/menu">Partner</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/menu", MENU_PAGE).await;

    let c = crawler();
    let discovery = MenuFinder::new(&c.pages)
        .find_menus(&base, 20)
        .await
        .expect("valid base URL");

    assert_eq!(discovery.pdfs, vec![format!("{}/files/dinner.pdf", base)]);
    assert_eq!(discovery.html_menu_pages.len(), 1);
    assert_eq!(discovery.html_menu_pages[0].url, format!("{}/menu", base));
    // /gallery carries no menu keyword and is never followed
    assert_eq!(discovery.visited.len(), 2);

    let pages: Vec<Page> = discovery
        .html_menu_pages
        .into_iter()
        .map(Page::from)
        .collect();
    let menu = MenuScraper::new(&c.pages).scrape(pages).await;

    assert_eq!(menu.pages_scraped, 1);
    assert!(menu
        .menu_text
        .starts_with(&format!("--- Menu page: {}/menu ---", base)));
    assert!(menu.menu_text.contains("## Starters"));
    assert!(menu.menu_text.contains("- Burrata, heirloom tomatoes €11.00"));
    assert!(!menu.menu_text.contains("Home"));
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private\nAllow: /private/menu$\n"),
        )
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/",
        r#"<a href="/private/menu">Menu</a><a href="/private/menu-old">Old menu</a>"#,
    )
    .await;
    mount_html(&server, "/private/menu", MENU_PAGE).await;
    Mock::given(method("GET"))
        .and(path("/private/menu-old"))
        .respond_with(html(MENU_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let c = crawler();
    assert!(c.robots.allowed(&format!("{}/private/menu", base)).await);
    assert!(!c.robots.allowed(&format!("{}/private/other", base)).await);
    assert!(c.robots.allowed(&format!("{}/public", base)).await);

    let discovery = MenuFinder::new(&c.pages)
        .find_menus(&base, 20)
        .await
        .expect("valid base URL");
    let urls: Vec<&str> = discovery
        .html_menu_pages
        .iter()
        .map(|p| p.url.as_str())
        .collect();
    let expected = format!("{}/private/menu", base);
    assert_eq!(urls, vec![expected.as_str()]);
}

#[tokio::test]
async fn test_robots_fetch_failure_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let c = crawler();
    let url = format!("{}/anything", server.uri());
    assert!(c.robots.allowed(&url).await);

    let evidence = c.robots.evidence(&url).await;
    assert_eq!(evidence.robots_txt, RobotsStatus::NotFound);
    assert_eq!(evidence.robots_allowed, Some(true));

    // Nothing listens on port 9 of localhost
    assert!(c.robots.allowed("http://127.0.0.1:9/menu").await);
}

#[tokio::test]
async fn test_user_agent_sent() {
    let server = MockServer::start().await;
    let config = Config::default();

    Mock::given(method("GET"))
        .and(path("/menu"))
        .and(header(
            "user-agent",
            config.user_agent.header_value().as_str(),
        ))
        .respond_with(html(MENU_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let c = crawler();
    assert!(c.pages.fetch(&format!("{}/menu", server.uri())).await.is_some());
}

struct FollowAll;

impl LinkPolicy for FollowAll {
    fn should_enqueue(&self, _candidate: &Url) -> bool {
        true
    }
}

#[tokio::test]
async fn test_cyclic_site_respects_page_budget() {
    let server = MockServer::start().await;
    mount_html(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_html(&server, "/b", r#"<a href="/c">C</a>"#).await;
    mount_html(&server, "/c", r#"<a href="/a">A</a>"#).await;

    let c = crawler();
    let start = format!("{}/a", server.uri());
    let target = CrawlTarget::new(&start, 2).expect("valid URL");
    let seeds = vec![Url::parse(&start).unwrap()];

    let mut handled = Vec::new();
    let report = CrawlFrontier::new(&c.pages, target)
        .crawl(seeds, &FollowAll, |url, _, _| handled.push(url.path().to_string()))
        .await;

    assert_eq!(report.visited.len(), 2);
    assert_eq!(handled, vec!["/a", "/b"]);
}

#[tokio::test]
async fn test_non_html_pages_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/menu.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let c = crawler();
    assert!(c
        .pages
        .fetch(&format!("{}/menu.json", server.uri()))
        .await
        .is_none());
    assert!(c
        .pages
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_pdf_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/lunch.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.7 lunch".to_vec())
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(html("<p>not a pdf</p>"))
        .mount(&server)
        .await;

    let c = crawler();
    let mut file = c
        .pdfs
        .download(&format!("{}/files/lunch.pdf", server.uri()))
        .await
        .expect("PDF path accepted despite generic content-type");
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).unwrap();
    assert_eq!(contents, b"%PDF-1.7 lunch");

    assert!(c
        .pdfs
        .download(&format!("{}/download", server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_contact_mining() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <main><p>Family-run trattoria in the old town since 1987, serving hand-made pasta,
        wood-fired pizza and a short list of natural wines from small growers.</p></main>
        <a href="mailto:Info@Trattoria.example?subject=Booking">Email us</a>
        <a href="tel:+1%20555%20123%204567">Call</a>
        <a href="https://www.instagram.com/trattoria_example">Instagram</a>
        <a href="/contact">Contact</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/contact",
        r#"<html><body>
        <address>Via Roma 12, 00100 Roma</address>
        <p>Bookings: events@trattoria.example or call 555-12</p>
        </body></html>"#,
    )
    .await;

    let c = crawler();
    let evidence = ContactInfoMiner::new(&c.pages)
        .extract(&base, 8)
        .await
        .expect("valid base URL");

    assert!(evidence.skipped.is_none());
    assert_eq!(evidence.visited_urls.len(), 8);
    assert!(evidence
        .emails
        .contains(&"info@trattoria.example".to_string()));
    assert!(evidence
        .emails
        .contains(&"events@trattoria.example".to_string()));
    assert_eq!(evidence.phones, vec!["+1 555 123 4567".to_string()]);
    assert_eq!(evidence.addresses, vec!["Via Roma 12, 00100 Roma".to_string()]);
    assert!(evidence
        .social_links
        .iter()
        .any(|link| link.contains("instagram.com/trattoria_example")));
    assert!(evidence
        .homepage_text
        .as_deref()
        .is_some_and(|text| text.contains("Family-run trattoria")));
    assert!(evidence.context_types.contains(&"restaurant".to_string()));
}

#[tokio::test]
async fn test_contact_mining_skipped_when_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: SmartMenuBot\nDisallow: /\n"))
        .mount(&server)
        .await;

    let c = crawler();
    let evidence = ContactInfoMiner::new(&c.pages)
        .extract(&server.uri(), 8)
        .await
        .expect("valid base URL");

    assert_eq!(evidence.skipped.as_deref(), Some("robots_txt_blocked"));
    assert!(evidence.visited_urls.is_empty());
}
