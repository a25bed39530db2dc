//! Menu discovery over the crawl frontier
//!
//! Walks a restaurant site from its homepage, following links whose URL
//! mentions a menu, and reports:
//! - every same-host PDF link seen on visited pages
//! - visited HTML pages whose URL and content both look like a menu

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::{CrawlFrontier, CrawlTarget, LinkPolicy};
use crate::crawler::parser::RobotsMeta;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// Default page budget for menu discovery
pub const DEFAULT_MAX_MENU_PAGES: usize = 20;

/// Path keywords that almost certainly point at a menu
const STRONG_PATH_KEYWORDS: &[&str] = &[
    "menu",
    "menus",
    "food-menu",
    "food_menu",
    "drink-menu",
    "drink_menu",
    "carte",
    "la-carte",
    "speisekarte",
    "karte",
    "getranke",
    "menu_food",
    "menu_drink",
    "menu_bar",
];

/// Path keywords that only suggest a menu
const WEAK_PATH_KEYWORDS: &[&str] = &[
    "food", "drink", "drinks", "brunch", "lunch", "dinner", "breakfast", "cocktail",
    "cocktails", "wine", "wines", "beer", "beers", "bistrot", "bistro", "brasserie",
    "trattoria", "osteria", "caffetteria", "bar-menu", "pub-menu", "kitchen", "dessert",
    "desserts", "starters", "mains", "sides", "tapas", "antipasti", "primi", "secondi",
    "kaart", "menukaart", "dranken", "eten", "carta", "bebidas", "comidas", "almuerzo",
    "cena", "pranzo", "colazione", "aperitivo", "digestivo",
];

/// Keywords that make a link worth following during discovery
const FOLLOW_KEYWORDS: &[&str] = &["menu", "carte", "speisekarte", "karte", "getranke"];

lazy_static! {
    static ref NON_MENU_PATH: Regex = Regex::new(
        r"(?i)/(about|contact|blog|news|press|careers|jobs|faq|team|gallery|events|booking|reserv|privacy|cookie|terms|legal|imprint|impressum|login|signup|register|cart|checkout|shop|store|account|search|sitemap|404|500)([/-]|$)"
    )
    .expect("static regex");
    static ref PENALIZED_PATH: Regex = Regex::new(
        r"/(blog|news|press|careers|jobs|contact|about|faq|team|gallery|events|booking|reserv|privacy|cookie|terms|legal|imprint|impressum)(/|$)"
    )
    .expect("static regex");
    static ref LANGUAGE_PREFIX: Regex = Regex::new(
        r"(?i)^/(en|it|de|fr|es|nl|pt|cs|pl|ru|ja|zh|ko|ar|tr|sv|da|fi|no|el|hu|ro|bg|hr|sk|sl|uk|ca|eu|gl|et|lv|lt)(/.*)$"
    )
    .expect("static regex");
    static ref PRICE: Regex = Regex::new(
        r"(?i)[€$£]\s?\d+[.,]?\d{0,2}|\d+[.,]\d{2}\s?(?:[€$£]|Kč)|\d+\s?(?:EUR|USD|GBP|CZK)\b"
    )
    .expect("static regex");
    static ref ITEM_PRICE_LINE: Regex =
        Regex::new(r"\S.{5,}\s+\d+[.,]?\d{0,2}\s*$").expect("static regex");
    static ref SECTIONS: Selector = Selector::parse(
        r#"h2, h3, h4, .menu-section, .menu-category, [class*="menu"]"#
    )
    .expect("static selector");
    static ref ITEMS: Selector = Selector::parse(
        r#"li, .menu-item, .dish, [class*="item"], [class*="dish"], [class*="price"], [class*="piatto"], [class*="plat"]"#
    )
    .expect("static selector");
}

/// A visited page classified as an HTML menu
#[derive(Debug, Clone, Serialize)]
pub struct MenuPage {
    pub url: String,
    #[serde(skip_serializing)]
    pub html: String,
}

/// Everything menu discovery found on one site
#[derive(Debug, Clone, Default, Serialize)]
pub struct MenuDiscovery {
    pub pdfs: Vec<String>,
    pub html_menu_pages: Vec<MenuPage>,
    pub visited: Vec<String>,
}

/// Follows links whose path or query mentions a menu keyword; keeps every PDF
///
/// Pages marked `nosnippet` are skipped as well as `noindex` ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct MenuLinkPolicy;

impl LinkPolicy for MenuLinkPolicy {
    fn should_enqueue(&self, candidate: &Url) -> bool {
        let path = candidate.path().to_lowercase();
        let query = candidate.query().unwrap_or("").to_lowercase();
        FOLLOW_KEYWORDS
            .iter()
            .any(|kw| path.contains(kw) || query.contains(kw))
    }

    fn collect_pdf(&self, _candidate: &Url) -> bool {
        true
    }

    fn skip_page(&self, meta: RobotsMeta) -> bool {
        meta.noindex || meta.nosnippet
    }
}

/// Finds menu PDFs and HTML menu pages on a restaurant website
pub struct MenuFinder<'a> {
    fetcher: &'a PageFetcher,
}

impl<'a> MenuFinder<'a> {
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Crawls at most `max_pages` pages starting from the homepage
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run(fetcher: &menu_scout::PageFetcher) -> Result<(), menu_scout::UrlError> {
    /// use menu_scout::MenuFinder;
    ///
    /// let discovery = MenuFinder::new(fetcher)
    ///     .find_menus("https://trattoria.example", 20)
    ///     .await?;
    /// println!("{} PDFs", discovery.pdfs.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_menus(
        &self,
        base_url: &str,
        max_pages: usize,
    ) -> Result<MenuDiscovery, crate::UrlError> {
        let max_pages = if max_pages == 0 {
            DEFAULT_MAX_MENU_PAGES
        } else {
            max_pages
        };
        let target = CrawlTarget::new(base_url, max_pages)?;
        let base = target.base_url.clone();
        let frontier = CrawlFrontier::new(self.fetcher, target);

        let mut pages = Vec::new();
        let report = frontier
            .crawl(vec![base.clone()], &MenuLinkPolicy, |url, document, html| {
                if is_menu_page(url, document) {
                    tracing::debug!("Classified {} as a menu page", url);
                    pages.push(MenuPage {
                        url: url.to_string(),
                        html: html.to_string(),
                    });
                }
            })
            .await;

        let html_menu_pages = dedupe_language_variants(pages, &base);
        tracing::info!(
            "Menu discovery on {}: {} PDFs, {} HTML menu pages ({} pages visited)",
            base,
            report.pdfs.len(),
            html_menu_pages.len(),
            report.visited.len()
        );

        Ok(MenuDiscovery {
            pdfs: report.pdfs,
            html_menu_pages,
            visited: report.visited,
        })
    }
}

/// URL-plus-content classification of one visited page
pub fn is_menu_page(url: &Url, document: &Html) -> bool {
    if is_excluded_path(url) {
        return false;
    }

    if url_score(url) > 0 {
        has_menu_content(document)
    } else {
        has_strong_menu_content(document)
    }
}

/// Keyword score of a URL path; zero means no menu signal
pub fn url_score(url: &Url) -> i32 {
    let path = url.path().to_lowercase();

    let strong = STRONG_PATH_KEYWORDS
        .iter()
        .filter(|kw| path.contains(*kw))
        .count() as i32;
    let weak = WEAK_PATH_KEYWORDS
        .iter()
        .filter(|kw| path.contains(*kw))
        .count() as i32;

    let mut score = strong * 10 + weak * 3;
    if PENALIZED_PATH.is_match(&path) {
        score -= 20;
    }
    score.max(0)
}

/// The homepage and well-known non-menu sections are never menu pages
pub fn is_excluded_path(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    path.is_empty() || path == "/" || NON_MENU_PATH.is_match(&path)
}

fn document_text(document: &Html) -> String {
    document.root_element().text().collect()
}

fn price_count(text: &str) -> usize {
    PRICE.find_iter(text).count()
}

/// Menu signals strong enough when the URL already suggests a menu
pub fn has_menu_content(document: &Html) -> bool {
    let text = document_text(document);
    if price_count(&text) >= 3 {
        return true;
    }

    let sections = document.select(&SECTIONS).count();
    let items = document.select(&ITEMS).count();
    if sections >= 2 && items >= 5 {
        return true;
    }

    let item_price_lines = text
        .lines()
        .filter(|line| ITEM_PRICE_LINE.is_match(line.trim()))
        .count();
    item_price_lines >= 4
}

/// Stricter signals for pages without any URL hint
pub fn has_strong_menu_content(document: &Html) -> bool {
    let text = document_text(document);
    if price_count(&text) >= 8 {
        return true;
    }

    let sections = document.select(&SECTIONS).count();
    let items = document.select(&ITEMS).count();
    sections >= 3 && items >= 10
}

/// Collapses `/en/food` and `/food` style duplicates
///
/// When the base URL carries a language prefix that language is preferred,
/// otherwise the unprefixed variant; failing both, the first one seen.
fn dedupe_language_variants(pages: Vec<MenuPage>, base: &Url) -> Vec<MenuPage> {
    if pages.len() <= 1 {
        return pages;
    }

    let preferred_lang = LANGUAGE_PREFIX
        .captures(&base.path().to_lowercase())
        .map(|caps| caps[1].to_string());

    // (canonical path, [(language, page)]) in first-seen order
    let mut groups: Vec<(String, Vec<(Option<String>, MenuPage)>)> = Vec::new();

    for page in pages {
        let Ok(url) = Url::parse(&page.url) else {
            continue;
        };
        let path = url.path().to_lowercase();

        let (lang, canonical) = match LANGUAGE_PREFIX.captures(&path) {
            Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
            None => (None, path.clone()),
        };
        let canonical = match canonical.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };

        match groups.iter_mut().find(|(key, _)| *key == canonical) {
            Some((_, variants)) => variants.push((lang, page)),
            None => groups.push((canonical, vec![(lang, page)])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(_, mut variants)| {
            let position = variants
                .iter()
                .position(|(lang, _)| *lang == preferred_lang)
                .unwrap_or(0);
            if variants.is_empty() {
                None
            } else {
                Some(variants.swap_remove(position).1)
            }
        })
        .collect()
}
