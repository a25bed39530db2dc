//! Order-insensitive line-set diff and its text report

use std::collections::HashSet;

/// Entries shown per side before the remainder is summarized
pub const MAX_REPORT_LINES: usize = 100;

pub const NO_DIFFERENCE_MESSAGE: &str =
    "(No textual difference detected; the change may be in formatting or metadata only)";

/// Lines present on only one side of a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDiff {
    /// Lines in the new text but not the old, in first-appearance order
    pub added: Vec<String>,
    /// Lines in the old text but not the new, in first-appearance order
    pub removed: Vec<String>,
    /// Non-blank lines in the old text
    pub old_lines: usize,
    /// Non-blank lines in the new text
    pub new_lines: usize,
}

impl LineDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compares two texts as sets of trimmed, non-blank lines
///
/// Reordering lines is not a change.
///
/// # Examples
///
/// ```
/// use menu_scout::monitor::diff_lines;
///
/// let diff = diff_lines("A\nB\nC", "B\nC\nD");
/// assert_eq!(diff.added, vec!["D"]);
/// assert_eq!(diff.removed, vec!["A"]);
/// ```
pub fn diff_lines(old_text: &str, new_text: &str) -> LineDiff {
    let old = significant_lines(old_text);
    let new = significant_lines(new_text);

    let old_set: HashSet<&str> = old.iter().copied().collect();
    let new_set: HashSet<&str> = new.iter().copied().collect();

    LineDiff {
        added: only_in(&new, &old_set),
        removed: only_in(&old, &new_set),
        old_lines: old.len(),
        new_lines: new.len(),
    }
}

/// Renders the review text stored on a change review
///
/// The `--- Previous version` header is only written when there was a
/// previous text to compare against.
pub fn render_report(diff: &LineDiff, had_previous: bool) -> String {
    let mut parts: Vec<String> = Vec::new();
    if had_previous {
        parts.push(format!("--- Previous version ({} lines)", diff.old_lines));
    }
    parts.push(format!("+++ New version ({} lines)", diff.new_lines));
    parts.push(String::new());

    push_section(&mut parts, "REMOVED", '-', &diff.removed);
    push_section(&mut parts, "ADDED", '+', &diff.added);

    if diff.is_empty() {
        parts.push(NO_DIFFERENCE_MESSAGE.to_string());
    }

    parts.join("\n")
}

fn push_section(parts: &mut Vec<String>, title: &str, marker: char, lines: &[String]) {
    if lines.is_empty() {
        return;
    }

    parts.push(format!("{} ({} lines):", title, lines.len()));
    parts.extend(
        lines
            .iter()
            .take(MAX_REPORT_LINES)
            .map(|line| format!("{} {}", marker, line)),
    );
    if lines.len() > MAX_REPORT_LINES {
        parts.push(format!("... ({} more)", lines.len() - MAX_REPORT_LINES));
    }
    parts.push(String::new());
}

fn significant_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn only_in(lines: &[&str], other: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter(|line| !other.contains(*line) && seen.insert(**line))
        .map(|line| line.to_string())
        .collect()
}
