//! Client-side templating cleanup
//!
//! Pages built with Alpine.js, Vue and similar frameworks ship prices as
//! binding expressions (`x-text="...format('15')"`) rather than text. Before
//! parsing, every start tag is rewritten: currency-formatter bindings become a
//! `data-materialized-text` attribute holding the rendered price, and all other
//! reactive attributes are dropped.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Attribute carrying text rendered from a templating expression
pub const MATERIALIZED_ATTR: &str = "data-materialized-text";

lazy_static! {
    static ref START_TAG: Regex = Regex::new(
        r#"<[A-Za-z][A-Za-z0-9-]*(?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*\s*/?>"#
    )
    .expect("static regex");
    static ref ATTRIBUTE: Regex = Regex::new(
        r#"\s+([^\s"'>/=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#
    )
    .expect("static regex");
    static ref CURRENCY_CALL: Regex = Regex::new(
        r#"currency:\s*['"](\w+)['"].*?format\(\s*['"]([\d.]+)['"]\s*\)"#
    )
    .expect("static regex");
}

/// Symbol for an ISO currency code, or the code itself
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "EUR" => "€",
        "GBP" => "£",
        "USD" => "$",
        "CZK" => "Kč",
        other => other,
    }
}

/// Renders a currency-formatter binding expression, e.g. `€15`
pub fn materialize_price(expression: &str) -> Option<String> {
    if !expression.contains("currency") {
        return None;
    }
    let caps = CURRENCY_CALL.captures(expression)?;
    Some(format!("{}{}", currency_symbol(&caps[1]), &caps[2]))
}

/// Whether an attribute belongs to a reactive framework or is an inline handler
pub fn is_reactive_attribute(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("x-")
        || name.starts_with('@')
        || name.starts_with(':')
        || name.starts_with("v-")
        || name.starts_with("ng-")
        || name == "data-bind"
        || (name.len() > 2 && name.starts_with("on") && name[2..].chars().all(|c| c.is_ascii_lowercase()))
}

/// Rewrites templating attributes in every start tag of `html`
pub fn materialize_and_strip(html: &str) -> String {
    START_TAG
        .replace_all(html, |tag: &Captures| rewrite_tag(&tag[0]))
        .into_owned()
}

fn rewrite_tag(tag: &str) -> String {
    ATTRIBUTE
        .replace_all(tag, |attr: &Captures| {
            let name = &attr[1];
            if name.eq_ignore_ascii_case("x-text") {
                let value = attr
                    .get(2)
                    .map(|v| v.as_str().trim_matches(|c| c == '"' || c == '\''))
                    .unwrap_or("");
                if let Some(price) = materialize_price(value) {
                    return format!(" {}=\"{}\"", MATERIALIZED_ATTR, price);
                }
            }

            if is_reactive_attribute(name) {
                String::new()
            } else {
                attr[0].to_string()
            }
        })
        .into_owned()
}
