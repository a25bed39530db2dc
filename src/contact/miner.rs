//! Contact-page crawl and evidence aggregation

use crate::clock::{Clock, SystemClock};
use crate::contact::classifier::{EstablishmentClassifier, KeywordClassifier};
use crate::contact::normalize::{normalize_email, normalize_phone, TEXT_EMAIL, TEXT_PHONE};
use crate::crawler::{resolve_link, CrawlFrontier, CrawlTarget, LinkPolicy, PageFetcher};
use crate::extract::truncate_chars;
use crate::url::host_without_www;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Default page budget for contact mining
pub const DEFAULT_MAX_CONTACT_PAGES: usize = 8;

const MAX_EMAILS: usize = 10;
const MAX_PHONES: usize = 10;
const MAX_ADDRESSES: usize = 5;
const MAX_SOCIAL_LINKS: usize = 10;
const MAX_ADDRESS_CHARS: usize = 220;
const MIN_PAGE_TEXT_CHARS: usize = 120;
const MAX_PAGE_TEXT_CHARS: usize = 2000;

/// Paths tried on every site regardless of what the homepage links to
pub const CONTACT_PATH_HINTS: &[&str] = &[
    "/",
    "/contact",
    "/contact-us",
    "/contacts",
    "/kontakt",
    "/contatto",
    "/contacto",
    "/kapcsolat",
    "/elerhetoseg",
    "/elerhetosegek",
    "/reservation",
    "/reservations",
    "/book",
    "/booking",
    "/find-us",
    "/location",
    "/locations",
    "/about",
    "/about-us",
    "/impressum",
    "/legal",
    "/privacy",
    "/terms",
];

const SOCIAL_DOMAINS: &[&str] = &[
    "instagram.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "tripadvisor.com",
    "tripadvisor.co.uk",
    "tripadvisor.ie",
    "linkedin.com",
    "yelp.com",
];

const TEXT_SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg"];

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("static selector");
    static ref ADDRESS: Selector = Selector::parse("address").expect("static selector");
    static ref CLASS_OR_ID: Selector = Selector::parse("[class], [id]").expect("static selector");
    static ref MAIN_LIKE: Selector = Selector::parse(
        r#"main, article, [role="main"], .content, #content, .page-content, .entry-content"#
    )
    .expect("static selector");
}

/// Longest "about" page seen during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutPage {
    pub url: String,
    pub text: String,
}

/// Deduplicated, capped contact information for one website
#[derive(Debug, Clone, Serialize)]
pub struct ContactEvidence {
    pub source_base_url: String,
    pub visited_urls: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub addresses: Vec<String>,
    pub social_links: Vec<String>,
    pub context_types: Vec<String>,
    pub about: Option<AboutPage>,
    pub homepage_text: Option<String>,
    pub extracted_at: DateTime<Utc>,
    /// Set when the run was not performed, e.g. `robots_txt_blocked`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl ContactEvidence {
    fn empty(source_base_url: String, extracted_at: DateTime<Utc>) -> Self {
        Self {
            source_base_url,
            visited_urls: Vec::new(),
            emails: Vec::new(),
            phones: Vec::new(),
            addresses: Vec::new(),
            social_links: Vec::new(),
            context_types: Vec::new(),
            about: None,
            homepage_text: None,
            extracted_at,
            skipped: None,
        }
    }

    /// Appends `value` unless present or `list` already holds `cap` entries
    fn push_capped(list: &mut Vec<String>, value: String, cap: usize) {
        if list.len() < cap && !list.contains(&value) {
            list.push(value);
        }
    }
}

/// Follows links that look like contact, about or legal pages
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactLinkPolicy;

impl LinkPolicy for ContactLinkPolicy {
    fn should_enqueue(&self, candidate: &Url) -> bool {
        let path = candidate.path().to_lowercase();
        let query = candidate.query().unwrap_or("").to_lowercase();

        ["contact", "about", "impressum", "legal", "privacy", "terms"]
            .iter()
            .any(|kw| path.contains(kw))
            || query.contains("contact")
    }
}

/// Crawls a restaurant website for contact details
pub struct ContactInfoMiner<'a> {
    fetcher: &'a PageFetcher,
    classifier: Box<dyn EstablishmentClassifier>,
    clock: Arc<dyn Clock>,
}

impl<'a> ContactInfoMiner<'a> {
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self {
            fetcher,
            classifier: Box::new(KeywordClassifier),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn EstablishmentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Visits at most `max_pages` pages (0 means the default of 8)
    ///
    /// Returns an evidence record with `skipped = "robots_txt_blocked"` and no
    /// visits when robots.txt disallows the base URL itself.
    pub async fn extract(&self, base_url: &str, max_pages: usize) -> crate::Result<ContactEvidence> {
        let max_pages = if max_pages == 0 {
            DEFAULT_MAX_CONTACT_PAGES
        } else {
            max_pages
        };
        let target = CrawlTarget::new(base_url, max_pages)?;
        let mut evidence =
            ContactEvidence::empty(target.base_url.to_string(), self.clock.now());

        if !self.fetcher.robots().allowed(target.base_url.as_str()).await {
            tracing::info!("robots.txt blocks {}, skipping contact crawl", target.base_url);
            evidence.skipped = Some("robots_txt_blocked".to_string());
            return Ok(evidence);
        }

        let seeds = target.seeds_with_hints(CONTACT_PATH_HINTS);
        let frontier = CrawlFrontier::new(self.fetcher, target);

        let report = frontier
            .crawl(seeds, &ContactLinkPolicy, |url, document, _html| {
                self.collect_page(url, document, &mut evidence);
            })
            .await;

        evidence.visited_urls = report.visited;

        tracing::info!(
            "Contact crawl of {}: {} emails, {} phones, {} addresses, {} social links ({} pages)",
            evidence.source_base_url,
            evidence.emails.len(),
            evidence.phones.len(),
            evidence.addresses.len(),
            evidence.social_links.len(),
            evidence.visited_urls.len()
        );

        Ok(evidence)
    }

    fn collect_page(&self, url: &Url, document: &Html, evidence: &mut ContactEvidence) {
        for href in document.select(&ANCHOR).filter_map(|a| a.value().attr("href")) {
            let href = href.trim();
            if has_scheme(href, "mailto:") {
                if let Some(email) = normalize_email(href) {
                    ContactEvidence::push_capped(&mut evidence.emails, email, MAX_EMAILS);
                }
            } else if has_scheme(href, "tel:") {
                if let Some(phone) = normalize_phone(href) {
                    ContactEvidence::push_capped(&mut evidence.phones, phone, MAX_PHONES);
                }
            }
        }

        let fragments = visible_fragments(document.root_element());

        for label in self.classifier.classify(&fragments.join(" ")) {
            ContactEvidence::push_capped(&mut evidence.context_types, label, usize::MAX);
        }

        for fragment in &fragments {
            for found in TEXT_EMAIL.find_iter(fragment) {
                if let Some(email) = normalize_email(found.as_str()) {
                    ContactEvidence::push_capped(&mut evidence.emails, email, MAX_EMAILS);
                }
            }
            for found in TEXT_PHONE.find_iter(fragment) {
                if let Some(phone) = normalize_phone(found.as_str()) {
                    ContactEvidence::push_capped(&mut evidence.phones, phone, MAX_PHONES);
                }
            }
        }

        for address in document.select(&ADDRESS) {
            let text = collapsed_text(address);
            if !text.is_empty() {
                let text = truncate_chars(&text, MAX_ADDRESS_CHARS);
                ContactEvidence::push_capped(&mut evidence.addresses, text, MAX_ADDRESSES);
            }
        }

        for element in document.select(&CLASS_OR_ID) {
            let mentions_address = ["class", "id"].iter().any(|attr| {
                element
                    .value()
                    .attr(attr)
                    .is_some_and(|v| v.to_lowercase().contains("address"))
            });
            if !mentions_address {
                continue;
            }

            let text = collapsed_text(element);
            if !text.is_empty() && text.chars().count() <= MAX_ADDRESS_CHARS {
                ContactEvidence::push_capped(&mut evidence.addresses, text, MAX_ADDRESSES);
            }
        }

        // Protocol-relative and relative hrefs resolve against the page
        for href in document.select(&ANCHOR).filter_map(|a| a.value().attr("href")) {
            let Some(link) = resolve_link(href, url) else {
                continue;
            };
            if host_without_www(&link).is_some_and(|host| SOCIAL_DOMAINS.contains(&host.as_str())) {
                ContactEvidence::push_capped(
                    &mut evidence.social_links,
                    link.to_string(),
                    MAX_SOCIAL_LINKS,
                );
            }
        }

        let lower_url = url.as_str().to_lowercase();
        let is_about = lower_url.contains("about") || lower_url.contains("story");
        let is_home = url.path().trim_end_matches('/').is_empty();
        if !is_about && !is_home {
            return;
        }

        let Some(text) = page_description_text(document) else {
            return;
        };

        if is_about {
            let longer = evidence
                .about
                .as_ref()
                .map_or(true, |best| text.chars().count() > best.text.chars().count());
            if longer {
                evidence.about = Some(AboutPage {
                    url: url.to_string(),
                    text,
                });
            }
        } else {
            evidence.homepage_text = Some(text);
        }
    }
}

fn has_scheme(href: &str, scheme: &str) -> bool {
    href.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// Whitespace-collapsed text nodes outside script-like elements
fn visible_fragments(root: ElementRef) -> Vec<String> {
    root.descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .filter_map(|ancestor| ancestor.value().as_element())
                    .any(|el| TEXT_SKIPPED_TAGS.contains(&el.name()));
                (!hidden).then(|| text.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            _ => None,
        })
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn collapsed_text(element: ElementRef) -> String {
    visible_fragments(element).join(" ")
}

/// Longest main-like container text (or the whole page), capped for description use
fn page_description_text(document: &Html) -> Option<String> {
    let mut candidates: Vec<String> = document
        .select(&MAIN_LIKE)
        .map(collapsed_text)
        .filter(|text| text.chars().count() >= MIN_PAGE_TEXT_CHARS)
        .collect();

    if candidates.is_empty() {
        let text = collapsed_text(document.root_element());
        if text.chars().count() >= MIN_PAGE_TEXT_CHARS {
            candidates.push(text);
        }
    }

    // First of the longest wins
    let best = candidates.into_iter().fold(None::<String>, |best, text| match best {
        Some(current) if current.chars().count() >= text.chars().count() => Some(current),
        _ => Some(text),
    })?;

    Some(truncate_chars(&best, MAX_PAGE_TEXT_CHARS))
}
