//! Configuration module for SitePack
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitepack::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitepack.toml")).unwrap();
//! println!("Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AppConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_for_run};
