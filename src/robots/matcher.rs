//! robots.txt path-pattern matching
//!
//! Patterns are prefix matches on the request path, where `*` stands for any
//! run of characters and a trailing `$` anchors the end of the path.

/// Checks if a request path matches a robots.txt path pattern
///
/// # Examples
///
/// ```
/// use menu_scout::robots::matches_path_pattern;
///
/// // Plain prefix
/// assert!(matches_path_pattern("/private", "/private/menu"));
/// assert!(!matches_path_pattern("/private", "/public"));
///
/// // Wildcard and end anchor
/// assert!(matches_path_pattern("/*.pdf$", "/files/menu.pdf"));
/// assert!(!matches_path_pattern("/*.pdf$", "/files/menu.pdf?v=2"));
/// assert!(matches_path_pattern("/private/menu$", "/private/menu"));
/// assert!(!matches_path_pattern("/private/menu$", "/private/menu/drinks"));
/// ```
pub fn matches_path_pattern(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    let (body, anchored) = match pattern.strip_suffix('$') {
        Some(body) => (body, true),
        None => (pattern, false),
    };

    let parts: Vec<&str> = body.split('*').collect();
    let first = parts[0];
    if !path.starts_with(first) {
        return false;
    }

    let mut pos = first.len();
    if parts.len() == 1 {
        return !anchored || pos == path.len();
    }

    let last_idx = parts.len() - 1;
    for part in &parts[1..last_idx] {
        match path[pos..].find(part) {
            Some(offset) => pos += offset + part.len(),
            None => return false,
        }
    }

    let last = parts[last_idx];
    if anchored {
        path.len() >= pos + last.len() && path.ends_with(last)
    } else {
        path[pos..].contains(last)
    }
}
