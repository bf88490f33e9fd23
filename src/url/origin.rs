use url::Url;

/// Extracts the serialized origin (scheme, host and port) of a URL
///
/// Returns `None` for unparsable URLs and for opaque origins such as
/// `data:` URLs, which never match any crawl origin.
///
/// # Examples
///
/// ```
/// use sitepack::url::origin_of;
///
/// assert_eq!(origin_of("https://Example.com/path?q=1"), Some("https://example.com".to_string()));
/// assert_eq!(origin_of("http://localhost:8080/"), Some("http://localhost:8080".to_string()));
/// assert_eq!(origin_of("data:text/plain,hi"), None);
/// ```
pub fn origin_of(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

/// Returns true if `url` belongs to the given serialized origin
pub fn is_same_origin(url: &str, origin: &str) -> bool {
    origin_of(url).is_some_and(|candidate| candidate == origin)
}
