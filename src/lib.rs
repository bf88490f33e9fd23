//! SitePack: single-site crawler and offline app packager
//!
//! This crate crawls one website, downloads the seed page and the
//! stylesheets, scripts, images and fonts it references, and packages
//! everything into a reproducible ZIP archive with a generated web app
//! manifest, service worker and readme.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod url;

use thiserror::Error;

/// Main error type for SitePack operations
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for SitePack operations
pub type Result<T> = std::result::Result<T, SiteError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use archive::{format_file_size, Archive, ArchiveBuilder};
pub use config::{AppConfig, Config};
pub use crawler::{Coordinator, CrawlResult, Progress};
pub use url::{relative_path, resolve};
