//! Tiered HTML-to-text extraction
//!
//! Text is taken from the first tier that yields at least
//! [`MIN_TIER_CHARS`] characters:
//!
//! 1. menu-like containers (class/id heuristics), five longest candidates
//! 2. the first main-content container
//! 3. the whole `<body>`
//!
//! Node text keeps structure hints for downstream parsing: headings become
//! `## ...`, list items `- ...`, definition lists `term` / `  description`.

use crate::extract::artifacts::{clean_javascript_noise, collapse_newlines, is_javascript_artifact};
use crate::extract::reactive::{materialize_and_strip, MATERIALIZED_ATTR};
use crate::extract::truncate_chars;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Node, Selector};

/// Minimum characters a tier must produce to be used
pub const MIN_TIER_CHARS: usize = 100;

/// Minimum characters for a single menu-container candidate
pub const MIN_CANDIDATE_CHARS: usize = 50;

/// Hard cap on extracted text per page
pub const MAX_TEXT_CHARS: usize = 15_000;

const MAX_MENU_CANDIDATES: usize = 5;

/// Elements whose subtree never contributes text
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "iframe", "nav", "footer", "header",
];

const MENU_CONTAINER_SELECTORS: &[&str] = &[
    r#"[class*="menu-section"]"#,
    r#"[class*="menu-category"]"#,
    r#"[class*="menu-item"]"#,
    r#"[class*="food-menu"]"#,
    r#"[class*="drink-menu"]"#,
    r#"[class*="wine-list"]"#,
    r#"[id*="menu"]"#,
    r#"[class*="menu-list"]"#,
    r#"[class*="menu-content"]"#,
    ".menu",
    "#menu",
    ".carte",
    ".speisekarte",
    "[data-menu]",
    "[data-category]",
];

const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    r#"[role="main"]"#,
    ".content",
    "#content",
    ".page-content",
    ".entry-content",
];

lazy_static! {
    static ref MENU_CONTAINERS: Vec<Selector> = compile(MENU_CONTAINER_SELECTORS);
    static ref MAIN_CONTENT: Vec<Selector> = compile(MAIN_CONTENT_SELECTORS);
    static ref BODY: Selector = Selector::parse("body").expect("static selector");
}

fn compile(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).expect("static selector"))
        .collect()
}

/// Converts menu-page HTML into clean, structure-preserving text
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts menu text from raw HTML, or `None` when every tier comes up short
    ///
    /// # Examples
    ///
    /// ```
    /// use menu_scout::ContentExtractor;
    ///
    /// let html = r#"<body><p>Welcome!</p><div class="menu-section">
    ///     <h3>Pizza</h3><ul><li>Margherita, tomato, mozzarella, basil</li>
    ///     <li>Diavola, spicy salami, chili oil, mozzarella</li></ul></div></body>"#;
    /// let text = ContentExtractor::new().extract(html).unwrap();
    /// assert!(text.contains("## Pizza"));
    /// assert!(text.contains("- Margherita"));
    /// assert!(!text.contains("Welcome"));
    /// ```
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(&materialize_and_strip(html));

        if let Some(text) = menu_container_text(&document) {
            return Some(text);
        }

        if let Some(text) = main_content_text(&document) {
            return Some(text);
        }

        body_text(&document)
    }
}

fn menu_container_text(document: &Html) -> Option<String> {
    let mut candidates: Vec<String> = Vec::new();

    for selector in MENU_CONTAINERS.iter() {
        for element in document.select(selector) {
            if in_noise_subtree(element) {
                continue;
            }
            let Some(text) = node_text(element) else {
                continue;
            };
            if text.chars().count() >= MIN_CANDIDATE_CHARS && !candidates.contains(&text) {
                candidates.push(text);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by_key(|text| std::cmp::Reverse(text.chars().count()));
    let joined = candidates
        .into_iter()
        .take(MAX_MENU_CANDIDATES)
        .collect::<Vec<_>>()
        .join("\n\n");

    (joined.chars().count() >= MIN_TIER_CHARS).then_some(joined)
}

fn main_content_text(document: &Html) -> Option<String> {
    MAIN_CONTENT.iter().find_map(|selector| {
        let element = document
            .select(selector)
            .find(|element| !in_noise_subtree(*element))?;
        node_text(element).filter(|text| text.chars().count() >= MIN_TIER_CHARS)
    })
}

fn body_text(document: &Html) -> Option<String> {
    let body = document.select(&BODY).next()?;
    node_text(body).filter(|text| text.chars().count() >= MIN_TIER_CHARS)
}

/// Checks if an element is, or sits inside, a noise element
fn in_noise_subtree(element: ElementRef) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors())
        .filter_map(|node| node.value().as_element())
        .any(|el| NOISE_TAGS.contains(&el.name()))
}

/// Structure-preserving text of a subtree, cleaned and capped
pub fn node_text(root: ElementRef) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();

    for node in root.descendants() {
        // Below a noise element or an already-rendered binding
        let mut hidden = false;
        let ancestors = if node.id() == root.id() {
            None
        } else {
            Some(node.ancestors())
        };
        for ancestor in ancestors.into_iter().flatten() {
            let Some(el) = ancestor.value().as_element() else {
                continue;
            };
            if el.attr(MATERIALIZED_ATTR).is_some() {
                hidden = true;
                break;
            }
            if ancestor.id() == root.id() {
                break;
            }
            if NOISE_TAGS.contains(&el.name()) {
                hidden = true;
                break;
            }
        }
        if hidden {
            continue;
        }

        match node.value() {
            Node::Element(element) => {
                if let Some(rendered) = element.attr(MATERIALIZED_ATTR) {
                    push_line(&mut lines, element.name(), rendered);
                }
            }
            Node::Text(text) => {
                let tag = node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .map(|element| element.name())
                    .unwrap_or("");
                push_line(&mut lines, tag, text);
            }
            _ => {}
        }
    }

    let joined = collapse_newlines(&lines.join("\n"));
    let cleaned = clean_javascript_noise(joined.trim());
    if cleaned.is_empty() {
        None
    } else {
        Some(truncate_chars(&cleaned, MAX_TEXT_CHARS))
    }
}

fn push_line(lines: &mut Vec<String>, tag: &str, raw: &str) {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() || is_javascript_artifact(&text) {
        return;
    }

    let line = match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => format!("\n## {}", text),
        "li" => format!("- {}", text),
        "dt" => format!("\n{}", text),
        "dd" => format!("  {}", text),
        _ => text,
    };
    lines.push(line);
}
