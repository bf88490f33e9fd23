//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl from seed URL to result:
//! - Validating the seed and creating a fresh session
//! - Fetching and parsing the seed page
//! - Fanning asset downloads out to a bounded pool of tasks
//! - Substituting fallback and placeholder content for failed fetches

use crate::archive::escape_html;
use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{Fetch, FetchFailure, FetchOutcome, FetchRequest, HttpFetcher};
use crate::crawler::parser::{extract_references, AssetReference};
use crate::crawler::progress::Progress;
use crate::crawler::session::{Asset, AssetStatus, CrawlResult, CrawlSession};
use crate::url::{parse_seed_url, relative_path};
use crate::{Result, SiteError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Media type of crawled pages and fallback pages
const PAGE_MEDIA_TYPE: &str = "text/html";

/// Media type of placeholder assets
const PLACEHOLDER_MEDIA_TYPE: &str = "text/plain";

/// Main crawler coordinator structure
///
/// A coordinator holds only configuration and the fetch capability; every
/// call to [`crawl`](Self::crawl) works on its own [`CrawlSession`], so one
/// coordinator can serve any number of independent crawls.
pub struct Coordinator<F: Fetch + ?Sized + 'static = HttpFetcher> {
    fetcher: Arc<F>,
    max_concurrent_fetches: usize,
    fetch_timeout: Duration,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator with an HTTP fetcher built from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.crawler, &config.user_agent)?;
        Ok(Self::new(Arc::new(fetcher), &config.crawler))
    }
}

impl<F: Fetch + ?Sized + 'static> Coordinator<F> {
    /// Creates a coordinator around any fetch capability
    pub fn new(fetcher: Arc<F>, crawler: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            max_concurrent_fetches: crawler
                .max_concurrent_fetches
                .clamp(1, Semaphore::MAX_PERMITS),
            fetch_timeout: Duration::from_millis(crawler.fetch_timeout_ms),
        }
    }

    /// Crawls the seed page and every asset it references
    ///
    /// # Crawl Flow
    ///
    /// 1. Parse the seed URL; this is the only step that can fail
    /// 2. Fetch the seed page (fallback page on failure, no asset extraction)
    /// 3. Extract asset references from the page
    /// 4. Claim each reference's path in document order, skipping duplicates
    /// 5. Fetch claimed assets concurrently (placeholder on failure)
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Crawl completed, possibly with degraded entries
    /// * `Err(SiteError::InvalidSeedUrl)` - The seed URL could not be parsed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitepack::config::Config;
    /// use sitepack::crawler::{Coordinator, Progress};
    ///
    /// # async fn example() -> Result<(), sitepack::SiteError> {
    /// let coordinator = Coordinator::from_config(&Config::default())?;
    /// let result = coordinator.crawl("https://example.com/", &Progress::disabled()).await?;
    /// println!("{} assets, {} bytes", result.asset_count(), result.total_size_bytes);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, seed_url: &str, progress: &Progress) -> Result<CrawlResult> {
        let base_url = parse_seed_url(seed_url).map_err(|e| SiteError::InvalidSeedUrl {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!("Starting crawl of {}", base_url);
        progress.emit("Starting website crawl...");

        let session = Arc::new(CrawlSession::new(base_url));
        let page_url = session.base_url().to_string();

        let references = self.crawl_page(&session, &page_url, progress).await;
        if !references.is_empty() {
            self.download_assets(&session, references, progress).await;
        }

        progress.emit("Processing downloaded content...");

        let result = match Arc::try_unwrap(session) {
            Ok(session) => session.into_result(),
            Err(shared) => shared.snapshot(),
        };

        tracing::info!(
            "Crawl completed: {} pages, {} assets, {} bytes",
            result.page_count,
            result.asset_count(),
            result.total_size_bytes
        );

        Ok(result)
    }

    /// Fetches one page and returns the asset references it contains
    ///
    /// A page that is already visited is a no-op. A page that fails to load
    /// is stored as a fallback page and yields no references.
    async fn crawl_page(
        &self,
        session: &CrawlSession,
        url: &str,
        progress: &Progress,
    ) -> Vec<AssetReference> {
        if !session.mark_visited(url) {
            tracing::debug!("Already visited {}", url);
            return Vec::new();
        }

        progress.emit(format!("Crawling: {}", url));

        let path = relative_path(url);
        let request = FetchRequest::for_origin(url, session.base_origin());

        match fetch_with_timeout(self.fetcher.as_ref(), &request, self.fetch_timeout).await {
            FetchOutcome::Ok { bytes, .. } => {
                let markup = String::from_utf8_lossy(&bytes).into_owned();
                session.insert(Asset::new(path, bytes, PAGE_MEDIA_TYPE, AssetStatus::Ok));

                let references = extract_references(&markup, url);
                tracing::debug!("Found {} asset references on {}", references.len(), url);
                references
            }
            FetchOutcome::Failed(reason) => {
                tracing::warn!("Failed to crawl {}: {}", url, reason);
                progress.emit(format!("Failed to crawl: {} ({})", url, reason));

                let fallback = fallback_page(url).into_bytes();
                session.insert(Asset::new(
                    path,
                    fallback,
                    PAGE_MEDIA_TYPE,
                    AssetStatus::Fallback,
                ));
                Vec::new()
            }
        }
    }

    /// Downloads every not-yet-stored reference through a bounded task pool
    async fn download_assets(
        &self,
        session: &Arc<CrawlSession>,
        references: Vec<AssetReference>,
        progress: &Progress,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let mut tasks = JoinSet::new();
        let mut claimed = Vec::new();

        for reference in references {
            let path = relative_path(&reference.absolute_url);

            // Claiming here, in document order, fixes the asset order no
            // matter which fetch completes first.
            if !session.claim(&path) {
                tracing::debug!("Skipping {} ({} already stored)", reference.absolute_url, path);
                continue;
            }
            claimed.push((path.clone(), reference.absolute_url.clone()));

            let fetcher = Arc::clone(&self.fetcher);
            let session = Arc::clone(session);
            let semaphore = Arc::clone(&semaphore);
            let progress = progress.clone();
            let timeout = self.fetch_timeout;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();

                progress.emit(format!("Downloading: {}", reference.absolute_url));

                let request = FetchRequest::for_origin(&reference.absolute_url, session.base_origin());
                let outcome = fetch_with_timeout(fetcher.as_ref(), &request, timeout).await;
                session.fill(asset_from_outcome(path, &reference, outcome, &progress));
            });
        }

        tracing::info!("Downloading {} assets", claimed.len());

        let mut task_failed = false;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Asset download task failed: {}", e);
                task_failed = true;
            }
        }

        // A task that died before filling its slot still gets a placeholder;
        // `fill` leaves already-stored paths alone.
        if task_failed {
            for (path, url) in claimed {
                session.fill(Asset::new(
                    path,
                    placeholder(&url).into_bytes(),
                    PLACEHOLDER_MEDIA_TYPE,
                    AssetStatus::Placeholder,
                ));
            }
        }
    }
}

/// Runs a fetch bounded by `timeout`; expiry counts as a failed fetch
pub async fn fetch_with_timeout<F: Fetch + ?Sized>(
    fetcher: &F,
    request: &FetchRequest,
    timeout: Duration,
) -> FetchOutcome {
    match tokio::time::timeout(timeout, fetcher.fetch(request)).await {
        Ok(outcome) => outcome,
        Err(_) => FetchOutcome::Failed(FetchFailure::Timeout),
    }
}

/// Turns a fetch outcome into the asset stored for a reference
fn asset_from_outcome(
    path: String,
    reference: &AssetReference,
    outcome: FetchOutcome,
    progress: &Progress,
) -> Asset {
    match outcome {
        FetchOutcome::Ok { bytes, .. } => {
            Asset::new(path, bytes, reference.media_type.clone(), AssetStatus::Ok)
        }
        FetchOutcome::Failed(reason) => {
            tracing::warn!("Failed to download {}: {}", reference.absolute_url, reason);
            progress.emit(format!(
                "Failed to download: {} ({})",
                reference.absolute_url, reason
            ));
            Asset::new(
                path,
                placeholder(&reference.absolute_url).into_bytes(),
                PLACEHOLDER_MEDIA_TYPE,
                AssetStatus::Placeholder,
            )
        }
    }
}

/// Placeholder content for an asset that could not be downloaded
pub fn placeholder(url: &str) -> String {
    format!("/* Failed to load asset: {} */", url)
}

/// Viewer page stored in place of a seed page that could not be downloaded
///
/// The page embeds the original URL in an iframe so the content stays
/// reachable when the archive is opened online.
pub fn fallback_page(url: &str) -> String {
    let url = escape_html(url);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Website Viewer</title>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; height: 100vh; display: flex; flex-direction: column; }}
    .header {{ background: #0284c7; color: white; padding: 1rem; text-align: center; }}
    .content {{ flex: 1; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 2rem; }}
    iframe {{ border: none; width: 100%; height: 80vh; margin-top: 1rem; }}
    .loading {{ font-size: 1.2rem; margin: 2rem 0; }}
  </style>
</head>
<body>
  <div class="header">
    <h1>Website Viewer</h1>
  </div>
  <div class="content">
    <div class="loading">Loading website content...</div>
    <p>Original page: <a href="{url}">{url}</a></p>
    <iframe src="{url}" onload="document.querySelector('.loading').style.display = 'none'"></iframe>
  </div>
</body>
</html>
"#
    )
}
