use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use menu_scout::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host with a leading `www.` removed
pub fn host_without_www(url: &Url) -> Option<String> {
    extract_host(url).map(|h| match h.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => h,
    })
}

/// Checks whether a URL lives on exactly the given host
///
/// The comparison is case-insensitive and exact: subdomains and the `www.`
/// variant count as different hosts, matching what a browser would consider
/// the same origin host.
pub fn is_same_host(url: &Url, host: &str) -> bool {
    extract_host(url).is_some_and(|h| h.eq_ignore_ascii_case(host))
}
