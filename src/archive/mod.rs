//! Archive module for packaging crawl results
//!
//! This module turns a [`CrawlResult`](crate::crawler::CrawlResult) into a
//! ZIP archive:
//! - Generated entry page, manifest, service worker, readme and icons
//! - Every crawled asset at its archive-relative path
//! - Human-readable size formatting for reports

mod builder;
mod format;
mod templates;

pub use builder::{safe_name, validate_entry_path, Archive, ArchiveBuilder, GENERATED_FILES};
pub use format::format_file_size;
pub use templates::{build_config, entry_page, escape_html, icon, manifest, readme, service_worker};

use thiserror::Error;

/// Archive-specific errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid archive path: '{0}'")]
    InvalidPath(String),

    #[error("Archive path '{0}' is reserved for a generated file")]
    ReservedPath(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize generated file: {0}")]
    Json(#[from] serde_json::Error),
}
