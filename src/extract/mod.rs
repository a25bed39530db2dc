//! Text extraction from fetched HTML
//!
//! - [`ContentExtractor`]: tiered, structure-preserving menu text
//! - [`MenuScraper`]: runs the extractor across discovered menu pages
//! - [`strip_text`]: whole-page visible text used for change detection

mod artifacts;
mod content;
mod menu_scraper;
mod plain;
mod reactive;

pub use artifacts::{clean_javascript_noise, is_javascript_artifact};
pub use content::{node_text, ContentExtractor, MAX_TEXT_CHARS, NOISE_TAGS};
pub use menu_scraper::{MenuScraper, MenuText, Page};
pub use plain::strip_text;
pub use reactive::{currency_symbol, materialize_and_strip, materialize_price};

/// Truncates to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("€€€€", 2), "€€");
        assert_eq!(truncate_chars("", 0), "");
    }
}
