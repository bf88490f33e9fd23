//! HTML parser for extracting asset references
//!
//! This module scans page markup for the sub-resources an offline copy
//! needs: stylesheets, scripts, images and font links.

use crate::url::resolve;
use scraper::{ElementRef, Html, Selector};

/// Kind of element an asset reference was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `<link rel="stylesheet" href>`
    Stylesheet,
    /// `<script src>`
    Script,
    /// `<img src>`
    Image,
    /// `<link href>` whose URL mentions "font"
    Font,
}

impl SourceKind {
    /// Media type recorded for assets of this kind
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Stylesheet => "text/css",
            Self::Script => "application/javascript",
            Self::Image => "image/*",
            Self::Font => "font/*",
        }
    }
}

/// An asset discovered on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Reference resolved against the page URL
    pub absolute_url: String,
    /// Declared media type
    pub media_type: String,
    /// Element kind the reference came from
    pub source_kind: SourceKind,
}

/// Selector matching every element that can carry an asset reference
const ASSET_SELECTOR: &str =
    r#"link[rel="stylesheet"][href], script[src], img[src], link[href*="font"]"#;

/// Extracts asset references from page markup, in document order
///
/// # Extraction Rules
///
/// **Include:**
/// - `<link rel="stylesheet" href="...">`
/// - `<script src="...">`
/// - `<img src="...">`
/// - `<link href="...">` where the href contains "font"
///
/// **Exclude:**
/// - Empty attributes and fragment-only values
/// - `data:`, `javascript:` and `blob:` URIs
/// - `<a href>` links (no page-to-page traversal)
///
/// An element matching both the stylesheet and font rules is reported once,
/// as a stylesheet.
///
/// # Example
///
/// ```
/// use sitepack::crawler::{extract_references, SourceKind};
///
/// let html = r#"<html><head><link rel="stylesheet" href="style.css"></head>
///               <body><img src="/logo.png"></body></html>"#;
/// let refs = extract_references(html, "https://example.com/");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].absolute_url, "https://example.com/style.css");
/// assert_eq!(refs[1].source_kind, SourceKind::Image);
/// ```
pub fn extract_references(markup: &str, page_url: &str) -> Vec<AssetReference> {
    let document = Html::parse_document(markup);

    let selector = match Selector::parse(ASSET_SELECTOR) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let (kind, value) = classify_element(&element)?;
            if !is_fetchable_reference(value) {
                return None;
            }

            Some(AssetReference {
                absolute_url: resolve(value, page_url),
                media_type: kind.media_type().to_string(),
                source_kind: kind,
            })
        })
        .collect()
}

/// Determines the kind of a matched element and the attribute carrying its URL
fn classify_element<'a>(element: &ElementRef<'a>) -> Option<(SourceKind, &'a str)> {
    let value = element.value();

    match value.name() {
        "link" => {
            let href = value.attr("href")?;
            if value.attr("rel") == Some("stylesheet") {
                Some((SourceKind::Stylesheet, href))
            } else {
                Some((SourceKind::Font, href))
            }
        }
        "script" => Some((SourceKind::Script, value.attr("src")?)),
        "img" => Some((SourceKind::Image, value.attr("src")?)),
        _ => None,
    }
}

/// Returns false for values that never name a downloadable resource
fn is_fetchable_reference(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') {
        return false;
    }

    let lower = value.to_ascii_lowercase();
    !(lower.starts_with("data:") || lower.starts_with("javascript:") || lower.starts_with("blob:"))
}
