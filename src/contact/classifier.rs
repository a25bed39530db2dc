//! Establishment-type inference from page text

use lazy_static::lazy_static;
use regex::Regex;

/// Labels a page's plain text with establishment types (e.g. `cafe`, `pub`)
pub trait EstablishmentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Vec<String>;
}

lazy_static! {
    static ref KEYWORD_TABLE: Vec<(&'static str, Regex)> = [
        ("restaurant", r"restaurants?|ristorante|restaurante|trattoria|osteria|brasserie|étterem"),
        ("cafe", r"caf[eé]s?|caff[eè]|coffee\s*(?:shop|house)|kaffeehaus|kávézó"),
        ("bar", r"cocktail\s*bar|bar\s*&\s*grill|lounge\s*bar"),
        ("pub", r"pubs?|gastropub|taproom|tavern"),
        ("bakery", r"bakery|bäckerei|boulangerie|panetteria|pékség"),
        ("pizzeria", r"pizzerias?"),
        ("wine_bar", r"wine\s*bar|enoteca|vinoteca|weinbar|borozó"),
        ("brewery", r"brewery|brewpub|brauhaus"),
    ]
    .iter()
    .map(|(label, pattern)| {
        let regex = Regex::new(&format!(r"(?i)\b(?:{})\b", pattern)).expect("static regex");
        (*label, regex)
    })
    .collect();
}

/// Keyword-table classifier
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl EstablishmentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Vec<String> {
        KEYWORD_TABLE
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(label, _)| label.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classifier() {
        let classifier = KeywordClassifier;
        assert_eq!(
            classifier.classify("A family trattoria and wine bar in the old town"),
            vec!["restaurant", "wine_bar"]
        );
        assert_eq!(classifier.classify("Neighbourhood Café"), vec!["cafe"]);
        assert!(classifier.classify("Opening hours 9-5").is_empty());
    }

    #[test]
    fn test_word_boundaries() {
        let classifier = KeywordClassifier;
        assert!(classifier.classify("republic").is_empty());
        assert!(classifier.classify("barrister").is_empty());
    }
}
