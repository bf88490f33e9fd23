//! Crawler module for page and asset fetching
//!
//! This module contains the core crawling logic, including:
//! - The fetch capability and its HTTP implementation
//! - HTML parsing and asset reference extraction
//! - Per-crawl session state
//! - Progress reporting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod progress;
mod session;

pub use coordinator::{fallback_page, fetch_with_timeout, placeholder, Coordinator};
pub use fetcher::{
    build_http_client, route_for, Fetch, FetchFailure, FetchOutcome, FetchRequest, FetchRoute,
    HttpFetcher,
};
pub use parser::{extract_references, AssetReference, SourceKind};
pub use progress::Progress;
pub use session::{Asset, AssetStatus, CrawlResult, CrawlSession};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl of the configured website
///
/// This is the main entry point for starting a crawl. It builds an HTTP
/// fetcher from the configuration and crawls `config.app.website_url`.
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed, possibly with placeholder entries
/// * `Err(SiteError)` - The seed URL was invalid or the client could not be built
pub async fn crawl(config: &Config, progress: &Progress) -> Result<CrawlResult> {
    let coordinator = Coordinator::from_config(config)?;
    coordinator.crawl(&config.app.website_url, progress).await
}
