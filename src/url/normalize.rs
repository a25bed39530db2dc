use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Parses a user-supplied website address into a crawlable base URL
///
/// Bare hosts such as `trattoria.example` get an `https://` scheme. Only
/// HTTP(S) URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use menu_scout::url::parse_base_url;
///
/// let url = parse_base_url("  trattoria.example/ ").unwrap();
/// assert_eq!(url.as_str(), "https://trattoria.example/");
/// ```
pub fn parse_base_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Normalizes a URL for visited-set membership
///
/// # Normalization Steps
///
/// 1. Remove fragment (everything after #)
/// 2. Remove trailing slash (except for root /)
/// 3. Remove tracking query parameters
/// 4. Sort remaining query parameters alphabetically
/// 5. Remove empty query string (trailing ?)
///
/// Scheme and host are kept as-is (the `url` crate already lowercases the
/// host and resolves dot segments), so the result is still the address that
/// gets fetched.
///
/// # Examples
///
/// ```
/// use menu_scout::url::normalize_crawl_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/menu/?utm_source=x#mains").unwrap();
/// assert_eq!(normalize_crawl_url(&url).as_str(), "https://example.com/menu");
/// ```
pub fn normalize_crawl_url(url: &Url) -> Url {
    let mut url = url.clone();

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
        if url.path().is_empty() {
            url.set_path("/");
        }
    }

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    url
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(s: &str) -> String {
        normalize_crawl_url(&Url::parse(s).unwrap()).to_string()
    }

    #[test]
    fn test_parse_base_url_adds_scheme() {
        let url = parse_base_url("example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_parse_base_url_keeps_http() {
        let url = parse_base_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let result = parse_base_url("ftp://example.com/");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_parse_base_url_rejects_blank() {
        assert!(parse_base_url("   ").is_err());
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(normalize("https://example.com/menu/"), "https://example.com/menu");
    }

    #[test]
    fn test_keep_root_slash() {
        assert_eq!(normalize("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(normalize("https://example.com/menu#wine"), "https://example.com/menu");
    }

    #[test]
    fn test_remove_tracking_params() {
        assert_eq!(
            normalize("https://example.com/menu?utm_source=ig&fbclid=abc"),
            "https://example.com/menu"
        );
    }

    #[test]
    fn test_sort_query_params() {
        assert_eq!(
            normalize("https://example.com/page?lang=en&category=menu"),
            "https://example.com/page?category=menu&lang=en"
        );
    }

    #[test]
    fn test_scheme_and_host_preserved() {
        assert_eq!(
            normalize("http://www.example.com/contact/"),
            "http://www.example.com/contact"
        );
    }

    #[test]
    fn test_dot_segments_resolved() {
        assert_eq!(normalize("https://example.com/a/../menu"), "https://example.com/menu");
    }
}
