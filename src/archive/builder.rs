//! ZIP archive assembly
//!
//! The builder lays out generated files first, then every crawled asset at
//! its stored path, and deflates everything with fixed options so identical
//! inputs produce identical bytes.

use crate::archive::templates;
use crate::archive::ArchiveError;
use crate::config::AppConfig;
use crate::crawler::{CrawlResult, Progress};
use crate::url::relative_path;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for every entry
const COMPRESSION_LEVEL: i64 = 6;

/// Generated entry a crawled root page may replace
const ENTRY_PAGE: &str = "index.html";

/// Paths of the generated entries, in archive order
pub const GENERATED_FILES: [&str; 6] = [
    "index.html",
    "manifest.json",
    "sw.js",
    "README.md",
    "icon-192.png",
    "icon-512.png",
];

/// A finished archive and the statistics it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// ZIP file content
    pub bytes: Vec<u8>,
    /// Total size of the crawled assets
    pub total_size_bytes: u64,
    /// Pages visited by the crawl
    pub page_count: usize,
    /// Crawled assets, including the page itself
    pub asset_count: usize,
    /// Entries that were left out, one line each
    pub warnings: Vec<String>,
}

impl Archive {
    /// Filename to save the archive under: whitespace runs become `_`
    ///
    /// ```
    /// use sitepack::archive::Archive;
    ///
    /// assert_eq!(Archive::suggested_filename("My  Cool App"), "My_Cool_App_website.zip");
    /// ```
    pub fn suggested_filename(app_name: &str) -> String {
        format!("{}_website.zip", safe_name(app_name))
    }

    /// Hex-encoded SHA-256 of the archive bytes
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Collapses whitespace runs in an app name into single underscores
pub fn safe_name(app_name: &str) -> String {
    app_name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Builds archives from crawl results
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    generated_at: DateTime<Utc>,
    progress: Progress,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Creates a builder stamped with the current time
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            progress: Progress::disabled(),
        }
    }

    /// Overrides the generation timestamp recorded in the readme
    pub fn generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Reports archive stages to `progress`
    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// The generation timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Assembles the archive for a crawl result
    ///
    /// # Entry Order
    ///
    /// 1. `index.html`, `manifest.json`, `sw.js`, `README.md`,
    ///    `icon-192.png`, `icon-512.png`
    /// 2. Every crawled asset in result order
    ///
    /// A crawled `index.html` replaces the generated entry page in place.
    /// Crawled assets at any other generated path, and assets with invalid
    /// paths, are skipped and listed in [`Archive::warnings`].
    ///
    /// # Returns
    ///
    /// * `Ok(Archive)` - Archive bytes and statistics
    /// * `Err(ArchiveError)` - Generated content or the ZIP writer failed
    pub fn build(&self, result: &CrawlResult, app: &AppConfig) -> Result<Archive, ArchiveError> {
        let mut warnings = Vec::new();

        let root_path = relative_path(&result.base_url);
        let mut entries: IndexMap<String, Cow<'_, [u8]>> = IndexMap::new();

        let mut precache: IndexSet<&str> = GENERATED_FILES.iter().copied().collect();
        precache.extend(result.paths().filter(|p| validate_entry_path(p).is_ok()));

        let generated = [
            templates::entry_page(app, &root_path),
            templates::manifest(app)?,
            templates::service_worker(precache.iter().copied())?,
            templates::readme(app, result, self.generated_at),
            templates::icon(&app.app_name, 192),
            templates::icon(&app.app_name, 512),
        ];
        for (name, content) in GENERATED_FILES.iter().zip(generated) {
            entries.insert(name.to_string(), Cow::Owned(content.into_bytes()));
        }

        self.progress.emit("Adding website assets to ZIP...");

        for (path, asset) in &result.assets {
            if let Err(e) = validate_entry_path(path) {
                tracing::warn!("Skipping asset: {}", e);
                warnings.push(e.to_string());
                continue;
            }

            if path != ENTRY_PAGE && entries.contains_key(path) {
                let e = ArchiveError::ReservedPath(path.clone());
                tracing::warn!("Skipping asset: {}", e);
                warnings.push(e.to_string());
                continue;
            }
            entries.insert(path.clone(), Cow::Borrowed(asset.content.as_slice()));
        }

        self.progress.emit("Generating ZIP file...");

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .last_modified_time(zip::DateTime::default());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &entries {
            if let Err(e) = write_entry(&mut writer, name, content, options) {
                tracing::warn!("Failed to add {} to archive: {}", name, e);
                warnings.push(format!("Failed to add {}: {}", name, e));
            }
        }

        let bytes = writer.finish()?.into_inner();
        tracing::info!(
            "Archive built: {} entries, {} bytes compressed",
            entries.len(),
            bytes.len()
        );

        Ok(Archive {
            bytes,
            total_size_bytes: result.total_size_bytes,
            page_count: result.page_count,
            asset_count: result.asset_count(),
            warnings,
        })
    }
}

/// Writes one file entry
fn write_entry<W: Write + std::io::Seek>(
    writer: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    writer.start_file(name, options)?;
    writer.write_all(content)?;
    Ok(())
}

/// Checks that a path can be stored as a relative archive entry
///
/// Rejects empty paths, absolute paths, backslashes, control characters,
/// and empty, `.` or `..` segments.
pub fn validate_entry_path(path: &str) -> Result<(), ArchiveError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.chars().any(char::is_control)
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        Err(ArchiveError::InvalidPath(path.to_string()))
    } else {
        Ok(())
    }
}
