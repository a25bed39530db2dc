//! JavaScript artifact filtering
//!
//! Inline scripts and binding expressions sometimes survive as text nodes.
//! Nodes that look like code are dropped before assembly, and a final pass
//! removes fragments that slipped through inside larger text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ARTIFACT_PATTERNS: Vec<Regex> = [
        r"\{\s*(var |let |const |return |function |focusImage|focusTitle|currentMain)",
        r"@mouse(leave|enter|over)\s*=",
        r"\(\(\)\s*=>",
        r"document\.querySelector",
        r"\.scrollIntoView",
        r"element\.scroll",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static regex"))
    .collect();
    static ref TEMPLATE_EXPRESSION: Regex = Regex::new(
        r#"(?s)\{\s*(?:var|let|const|return|focusImage|focusTitle|currentMain)[^}]*\}\)?"?\s*"#
    )
    .expect("static regex");
    static ref LEAKED_HANDLER: Regex =
        Regex::new(r#"(?s)@(?:click|mouseleave|mouseenter|mouseover)="[^"]*"\s*"#)
            .expect("static regex");
    static ref ORPHANED_CLOSE: Regex = Regex::new(r#"\)"\s*>"#).expect("static regex");
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").expect("static regex");
}

/// Checks if a text node is JavaScript rather than content
pub fn is_javascript_artifact(text: &str) -> bool {
    ARTIFACT_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

/// Removes residual script fragments from assembled text
pub fn clean_javascript_noise(text: &str) -> String {
    let result = TEMPLATE_EXPRESSION.replace_all(text, "");
    let result = LEAKED_HANDLER.replace_all(&result, "");
    let result = ORPHANED_CLOSE.replace_all(&result, "");
    collapse_newlines(&result).trim().to_string()
}

/// Collapses runs of three or more newlines into a blank line
pub fn collapse_newlines(text: &str) -> String {
    EXCESS_NEWLINES.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_artifacts() {
        assert!(is_javascript_artifact("{ var x = 1; }"));
        assert!(is_javascript_artifact("{focusImage = 2}"));
        assert!(is_javascript_artifact("@mouseenter = 'x'"));
        assert!(is_javascript_artifact("(() => init())"));
        assert!(is_javascript_artifact("document.querySelector('#a')"));
        assert!(is_javascript_artifact("el.scrollIntoView()"));
        assert!(!is_javascript_artifact("Margherita {classic}"));
        assert!(!is_javascript_artifact("Tiramisu €7"));
    }

    #[test]
    fn test_cleans_leaked_fragments() {
        let text = "Soup €5\n{ return focusTitle })\" \nSalad €6 @click=\"open()\" done";
        let cleaned = clean_javascript_noise(text);
        assert!(!cleaned.contains("return"));
        assert!(!cleaned.contains("@click"));
        assert!(cleaned.contains("Soup €5"));
        assert!(cleaned.contains("Salad €6"));
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("a\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }
}
