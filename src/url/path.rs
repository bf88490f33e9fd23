use url::Url;

/// Storage path used when a URL cannot be parsed at all
pub const DEFAULT_PAGE_PATH: &str = "index.html";

/// Maps an absolute URL to its archive-relative storage path
///
/// # Mapping Rules
///
/// 1. Take the URL's path component (query and fragment are ignored)
/// 2. A path ending in `/` gets `index.html` appended
/// 3. A final segment without a `.` gets `.html` appended
/// 4. The leading `/` and empty segments are dropped
///
/// The mapping is pure and total: unparsable input maps to `index.html`.
/// It is the deduplication key for a crawl, so distinct URLs may collide
/// (`/app.js?v=1` and `/app.js?v=2` both map to `app.js`).
///
/// # Examples
///
/// ```
/// use sitepack::url::relative_path;
///
/// assert_eq!(relative_path("https://example.com/"), "index.html");
/// assert_eq!(relative_path("https://example.com/about"), "about.html");
/// assert_eq!(relative_path("https://example.com/css/site.css?v=2"), "css/site.css");
/// ```
pub fn relative_path(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return DEFAULT_PAGE_PATH.to_string(),
    };

    // Empty segments never reach the stored path.
    let mut path = parsed
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if path.is_empty() {
        path.push_str(DEFAULT_PAGE_PATH);
    } else if parsed.path().ends_with('/') {
        path.push('/');
        path.push_str(DEFAULT_PAGE_PATH);
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if !last_segment.contains('.') {
        path.push_str(".html");
    }

    path
}
