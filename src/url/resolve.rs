use crate::UrlError;
use url::Url;

/// Resolves a possibly-relative reference against a page URL
///
/// Standard URL resolution rules apply: scheme-relative (`//cdn.com/a.js`),
/// root-relative (`/a.js`) and path-relative (`a.js`, `../a.js`) references,
/// with query strings and fragments carried over from the reference.
///
/// Malformed input never raises: if either the base or the joined result
/// cannot be parsed, the trimmed reference is returned unchanged. Callers must
/// treat such a value as possibly unfetchable.
///
/// # Examples
///
/// ```
/// use sitepack::url::resolve;
///
/// assert_eq!(resolve("style.css", "https://example.com/"), "https://example.com/style.css");
/// assert_eq!(resolve("//cdn.example.net/a.js", "https://example.com/"), "https://cdn.example.net/a.js");
/// assert_eq!(resolve("/img/logo.png", "not a url"), "/img/logo.png");
/// ```
pub fn resolve(reference: &str, base_url: &str) -> String {
    let reference = reference.trim();

    match Url::parse(base_url).and_then(|base| base.join(reference)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => reference.to_string(),
    }
}

/// Parses a seed URL, accepting only absolute HTTP(S) URLs with a host
///
/// This is the only URL validation that can fail a crawl.
pub fn parse_seed_url(seed: &str) -> Result<Url, UrlError> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
