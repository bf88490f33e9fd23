//! Per-crawl session state
//!
//! A `CrawlSession` is created for every crawl call and owns the visited set,
//! the ordered asset map and the running size total. All mutation goes
//! through one mutex, so concurrent fetch tasks can share it behind an `Arc`.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// How an asset's content was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetStatus {
    /// Downloaded from the site
    Ok,
    /// Synthesized page standing in for a seed page that failed to load
    Fallback,
    /// Synthesized text standing in for an asset that failed to load
    Placeholder,
}

/// A stored resource, identified by its archive-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Archive-relative path
    pub path: String,
    /// Raw content
    pub content: Vec<u8>,
    /// Always `content.len()`
    pub size_bytes: u64,
    /// Declared media type
    pub media_type: String,
    /// Origin of the content
    pub status: AssetStatus,
}

impl Asset {
    /// Creates an asset, deriving its size from the content
    pub fn new(
        path: impl Into<String>,
        content: Vec<u8>,
        media_type: impl Into<String>,
        status: AssetStatus,
    ) -> Self {
        let size_bytes = content.len() as u64;
        Self {
            path: path.into(),
            content,
            size_bytes,
            media_type: media_type.into(),
            status,
        }
    }
}

/// Immutable snapshot of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Seed URL the crawl started from
    pub base_url: String,
    /// Assets keyed by path, in claim order
    pub assets: IndexMap<String, Asset>,
    /// Sum of all asset sizes
    pub total_size_bytes: u64,
    /// Number of pages visited
    pub page_count: usize,
}

impl CrawlResult {
    /// Number of stored assets, including the page itself
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Looks up an asset by its archive-relative path
    pub fn get(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Archive-relative paths in claim order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Counts assets with the given status
    pub fn count_by_status(&self, status: AssetStatus) -> usize {
        self.assets.values().filter(|a| a.status == status).count()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    visited: HashSet<String>,
    // `None` marks a path claimed by an in-flight fetch.
    assets: IndexMap<String, Option<Asset>>,
    total_size_bytes: u64,
}

/// Mutable state for one crawl run
#[derive(Debug)]
pub struct CrawlSession {
    base_url: Url,
    base_origin: String,
    state: Mutex<SessionState>,
}

impl CrawlSession {
    /// Starts an empty session for the given seed URL
    pub fn new(base_url: Url) -> Self {
        let base_origin = base_url.origin().ascii_serialization();
        Self {
            base_url,
            base_origin,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// The seed URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Serialized origin of the seed URL
    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Every mutation completes within one guard, so a poisoned lock
        // still holds consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&self, url: &str) -> bool {
        self.lock().visited.insert(url.to_string())
    }

    /// Reserves `path` for a pending fetch
    ///
    /// Returns false if the path is already stored or claimed. The check and
    /// the reservation happen under one lock, so two tasks can never both
    /// win the same path. The reservation fixes the path's position in the
    /// final asset order.
    pub fn claim(&self, path: &str) -> bool {
        let mut state = self.lock();
        if state.assets.contains_key(path) {
            return false;
        }
        state.assets.insert(path.to_string(), None);
        true
    }

    /// Stores an asset into a slot previously reserved with [`claim`](Self::claim)
    ///
    /// Unclaimed paths are claimed on the fly. Returns false, leaving the
    /// session untouched, if the path already holds content.
    pub fn fill(&self, asset: Asset) -> bool {
        let mut state = self.lock();
        let slot = state.assets.entry(asset.path.clone()).or_insert(None);
        if slot.is_some() {
            return false;
        }
        let size = asset.size_bytes;
        *slot = Some(asset);
        state.total_size_bytes += size;
        true
    }

    /// Claims and fills in one step; returns false if the path was taken
    pub fn insert(&self, asset: Asset) -> bool {
        let mut state = self.lock();
        if state.assets.contains_key(&asset.path) {
            return false;
        }
        state.total_size_bytes += asset.size_bytes;
        state.assets.insert(asset.path.clone(), Some(asset));
        true
    }

    /// Copies the current state into a result snapshot
    pub fn snapshot(&self) -> CrawlResult {
        let state = self.lock();
        CrawlResult {
            base_url: self.base_url.to_string(),
            assets: state
                .assets
                .iter()
                .filter_map(|(path, slot)| slot.clone().map(|asset| (path.clone(), asset)))
                .collect(),
            total_size_bytes: state.total_size_bytes,
            page_count: state.visited.len(),
        }
    }

    /// Converts the session into its result snapshot
    ///
    /// Claimed paths that never received content are dropped.
    pub fn into_result(self) -> CrawlResult {
        let base_url = self.base_url.to_string();
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);

        let assets: IndexMap<String, Asset> = state
            .assets
            .into_iter()
            .filter_map(|(path, slot)| slot.map(|asset| (path, asset)))
            .collect();

        CrawlResult {
            base_url,
            assets,
            total_size_bytes: state.total_size_bytes,
            page_count: state.visited.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn create_test_session() -> CrawlSession {
        CrawlSession::new(Url::parse("https://example.com/").unwrap())
    }

    fn text_asset(path: &str, body: &str) -> Asset {
        Asset::new(path, body.as_bytes().to_vec(), "text/plain", AssetStatus::Ok)
    }

    #[test]
    fn test_asset_size_matches_content() {
        let asset = text_asset("a.txt", "hello");
        assert_eq!(asset.size_bytes, 5);
    }

    #[test]
    fn test_base_origin() {
        let session = CrawlSession::new(Url::parse("https://example.com:8443/a/b").unwrap());
        assert_eq!(session.base_origin(), "https://example.com:8443");
    }

    #[test]
    fn test_mark_visited_only_once() {
        let session = create_test_session();
        assert!(session.mark_visited("https://example.com/"));
        assert!(!session.mark_visited("https://example.com/"));
        assert_eq!(session.snapshot().page_count, 1);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let session = create_test_session();
        assert!(session.claim("style.css"));
        assert!(!session.claim("style.css"));
        assert!(!session.claim("style.css"));
        assert!(session.snapshot().get("style.css").is_none());
    }

    #[test]
    fn test_fill_updates_total() {
        let session = create_test_session();
        session.claim("a.css");
        assert!(session.fill(text_asset("a.css", "body{}")));
        assert_eq!(session.snapshot().total_size_bytes, 6);
        assert_eq!(session.snapshot().asset_count(), 1);
    }

    #[test]
    fn test_fill_twice_keeps_first() {
        let session = create_test_session();
        assert!(session.fill(text_asset("a.css", "first")));
        assert!(!session.fill(text_asset("a.css", "second-longer")));
        assert_eq!(session.snapshot().total_size_bytes, 5);
    }

    #[test]
    fn test_insert_rejects_claimed_path() {
        let session = create_test_session();
        session.claim("index.html");
        assert!(!session.insert(text_asset("index.html", "x")));
        assert_eq!(session.snapshot().total_size_bytes, 0);
    }

    #[test]
    fn test_result_preserves_claim_order() {
        let session = create_test_session();
        session.claim("b.css");
        session.claim("a.css");
        session.fill(text_asset("a.css", "aa"));
        session.fill(text_asset("b.css", "b"));

        let result = session.into_result();
        assert_eq!(result.paths().collect::<Vec<_>>(), vec!["b.css", "a.css"]);
        assert_eq!(result.total_size_bytes, 3);
    }

    #[test]
    fn test_result_drops_unfilled_claims() {
        let session = create_test_session();
        session.mark_visited("https://example.com/");
        session.claim("pending.js");
        session.insert(text_asset("index.html", "<html></html>"));

        let result = session.into_result();
        assert_eq!(result.asset_count(), 1);
        assert!(result.get("pending.js").is_none());
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_snapshot_matches_into_result() {
        let session = create_test_session();
        session.mark_visited("https://example.com/");
        session.insert(text_asset("index.html", "<p>hi</p>"));
        session.insert(text_asset("a.css", "a{}"));

        let snapshot = session.snapshot();
        assert_eq!(snapshot, session.into_result());
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let session = Arc::new(create_test_session());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || session.claim("shared.js"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_total_matches_sum_of_sizes() {
        let session = create_test_session();
        for (path, body) in [("a", "1"), ("b", "22"), ("c", "333")] {
            session.insert(text_asset(path, body));
        }
        let result = session.into_result();
        let sum: u64 = result.assets.values().map(|a| a.size_bytes).sum();
        assert_eq!(result.total_size_bytes, sum);
        assert_eq!(result.count_by_status(AssetStatus::Ok), 3);
    }
}
