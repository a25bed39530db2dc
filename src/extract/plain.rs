//! Plain-text rendering for change detection
//!
//! Unlike [`ContentExtractor`](crate::extract::ContentExtractor), this keeps
//! every visible text node (one per line) so that fingerprints and diffs see
//! the whole page rather than the best-looking section.

use lazy_static::lazy_static;
use scraper::{Html, Node, Selector};

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "nav", "footer", "header"];

lazy_static! {
    static ref BODY: Selector = Selector::parse("body").expect("static selector");
}

/// Visible text of an HTML page, one whitespace-collapsed text node per line
///
/// # Examples
///
/// ```
/// use menu_scout::extract::strip_text;
///
/// let html = "<body><header>Logo</header><h1>Menu</h1><p>Soup   of the day</p></body>";
/// assert_eq!(strip_text(html), "Menu\nSoup of the day");
/// ```
pub fn strip_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut lines: Vec<String> = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let skipped = node
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|el| SKIPPED_TAGS.contains(&el.name()));
        if skipped {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}
