//! Email and phone normalization

use lazy_static::lazy_static;
use regex::Regex;

/// Minimum digits for a phone candidate to be kept
pub const MIN_PHONE_DIGITS: usize = 7;

lazy_static! {
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex");
    /// Email pattern for free text (RFC 5322 simplified)
    pub static ref TEXT_EMAIL: Regex =
        Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("static regex");
    /// Permissive phone pattern for free text
    pub static ref TEXT_PHONE: Regex = Regex::new(r"\+?\d[\d\s().-]{6,}\d").expect("static regex");
    static ref PHONE_DISALLOWED: Regex = Regex::new(r"[^0-9+(). -]").expect("static regex");
}

/// Normalizes a `mailto:` href or bare address
///
/// Strips the scheme and any `?query`, requires a `local@domain.tld` shape
/// and lowercases the result.
///
/// # Examples
///
/// ```
/// use menu_scout::contact::normalize_email;
///
/// assert_eq!(
///     normalize_email("mailto:Chef@Restaurant.com?subject=hi").as_deref(),
///     Some("chef@restaurant.com")
/// );
/// assert_eq!(normalize_email("mailto:nobody"), None);
/// ```
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_scheme = match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("mailto:") => &trimmed[7..],
        _ => trimmed,
    };

    let email = without_scheme.split('?').next().unwrap_or("").trim();
    if EMAIL_SHAPE.is_match(email) {
        Some(email.to_lowercase())
    } else {
        None
    }
}

/// Normalizes a `tel:` href or phone-like text
///
/// Percent-escapes are decoded, whitespace (including non-breaking spaces)
/// collapsed, characters outside `[0-9+(). -]` dropped, and candidates with
/// fewer than [`MIN_PHONE_DIGITS`] digits rejected.
///
/// # Examples
///
/// ```
/// use menu_scout::contact::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 (555) 123-4567").as_deref(), Some("+1 (555) 123-4567"));
/// assert_eq!(normalize_phone("tel:%2B44%2020%207946%200000").as_deref(), Some("+44 20 7946 0000"));
/// assert_eq!(normalize_phone("555-12"), None);
/// ```
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_scheme = match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("tel:") => &trimmed[4..],
        _ => trimmed,
    };
    let without_query = without_scheme.split('?').next().unwrap_or("");

    let decoded = urlencoding::decode(without_query)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| without_query.to_string());

    let spaced = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    let filtered = PHONE_DISALLOWED.replace_all(&spaced, "");
    let phone = filtered.split_whitespace().collect::<Vec<_>>().join(" ");

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return None;
    }

    Some(phone)
}
