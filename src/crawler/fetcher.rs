//! HTTP fetcher implementation
//!
//! This module handles all network requests for the crawler, including:
//! - The `Fetch` capability the coordinator depends on
//! - Choosing a direct or proxied route per URL
//! - Building HTTP clients with proper user agent strings
//! - Classifying failures without ever raising them

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::is_same_origin;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// How a request reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRoute {
    /// Same-origin request sent straight to the target
    Direct,
    /// Cross-origin request sent through the configured proxy
    Proxied,
}

/// A single fetch to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute target URL
    pub url: String,
    /// Route selected by origin comparison
    pub route: FetchRoute,
}

impl FetchRequest {
    /// Builds a request for `url`, routed according to the crawl's base origin
    pub fn for_origin(url: &str, base_origin: &str) -> Self {
        Self {
            url: url.to_string(),
            route: route_for(url, base_origin),
        }
    }
}

/// Why a fetch did not produce content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Server answered with a non-success status
    Status(u16),
    /// No answer within the fetch timeout
    Timeout,
    /// Connection could not be established
    Connect,
    /// Any other transport or body read error
    Transport(String),
    /// The URL could not be requested at all
    InvalidUrl(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timeout"),
            Self::Connect => write!(f, "connection refused"),
            Self::Transport(error) => write!(f, "transport error: {}", error),
            Self::InvalidUrl(url) => write!(f, "invalid URL: {}", url),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Successfully fetched the resource
    Ok {
        /// Response body
        bytes: Vec<u8>,
        /// Content-Type header value, if the server sent one
        content_type: Option<String>,
    },

    /// The resource could not be fetched
    Failed(FetchFailure),
}

/// Selects the route for `url`: direct when it shares the crawl's origin, proxied otherwise
pub fn route_for(url: &str, base_origin: &str) -> FetchRoute {
    if is_same_origin(url, base_origin) {
        FetchRoute::Direct
    } else {
        FetchRoute::Proxied
    }
}

/// Capability to retrieve the bytes behind a URL
///
/// Implementations report ordinary network and HTTP failures as
/// [`FetchOutcome::Failed`] and never mutate crawl state.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches one resource
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sitepack::config::UserAgentConfig;
/// use sitepack::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    proxy_url: Option<String>,
}

impl HttpFetcher {
    /// Creates a fetcher; `proxy_url` is the prefix used for proxied requests
    pub fn new(client: Client, proxy_url: Option<String>) -> Self {
        Self {
            client,
            proxy_url: proxy_url.filter(|p| !p.is_empty()),
        }
    }

    /// Builds a fetcher from crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(crawler.fetch_timeout_ms);
        let client = build_http_client(user_agent, timeout)?;
        Ok(Self::new(client, crawler.proxy_url.clone()))
    }

    /// Computes the URL actually requested for `request`
    ///
    /// Proxied requests append the percent-encoded target to the proxy prefix.
    /// Without a proxy, every request goes direct.
    pub fn request_url(&self, request: &FetchRequest) -> String {
        match (request.route, &self.proxy_url) {
            (FetchRoute::Proxied, Some(proxy)) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(request.url.as_bytes()).collect();
                format!("{}{}", proxy, encoded)
            }
            _ => request.url.clone(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        let target = self.request_url(request);

        if url::Url::parse(&target).is_err() {
            return FetchOutcome::Failed(FetchFailure::InvalidUrl(target));
        }

        tracing::debug!("GET {} ({:?})", target, request.route);

        let response = match self.client.get(&target).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(classify_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failed(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes().await {
            Ok(body) => FetchOutcome::Ok {
                bytes: body.to_vec(),
                content_type,
            },
            Err(e) => FetchOutcome::Failed(classify_error(&e)),
        }
    }
}

/// Maps a reqwest error onto a fetch failure
fn classify_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Connect
    } else {
        FetchFailure::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_fetcher(proxy: Option<&str>) -> HttpFetcher {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
        HttpFetcher::new(client, proxy.map(str::to_string))
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_route_for_same_origin() {
        assert_eq!(
            route_for("https://example.com/style.css", "https://example.com"),
            FetchRoute::Direct
        );
    }

    #[test]
    fn test_route_for_cross_origin() {
        assert_eq!(
            route_for("https://cdn.example.net/lib.js", "https://example.com"),
            FetchRoute::Proxied
        );
    }

    #[test]
    fn test_proxied_request_url_is_encoded() {
        let fetcher = create_test_fetcher(Some("https://proxy.example.org/raw?url="));
        let request = FetchRequest {
            url: "https://cdn.example.net/a.js?v=1&x=2".to_string(),
            route: FetchRoute::Proxied,
        };
        assert_eq!(
            fetcher.request_url(&request),
            "https://proxy.example.org/raw?url=https%3A%2F%2Fcdn.example.net%2Fa.js%3Fv%3D1%26x%3D2"
        );
    }

    #[test]
    fn test_direct_request_url_unchanged() {
        let fetcher = create_test_fetcher(Some("https://proxy.example.org/raw?url="));
        let request = FetchRequest::for_origin("https://example.com/a.css", "https://example.com");
        assert_eq!(fetcher.request_url(&request), "https://example.com/a.css");
    }

    #[test]
    fn test_empty_proxy_means_direct() {
        let fetcher = create_test_fetcher(Some(""));
        let request = FetchRequest::for_origin("https://cdn.example.net/a.js", "https://example.com");
        assert_eq!(request.route, FetchRoute::Proxied);
        assert_eq!(fetcher.request_url(&request), "https://cdn.example.net/a.js");
    }

    #[tokio::test]
    async fn test_unparsable_url_fails_without_request() {
        let fetcher = create_test_fetcher(None);
        let request = FetchRequest {
            url: "not a url".to_string(),
            route: FetchRoute::Direct,
        };
        let outcome = fetcher.fetch(&request).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Failed(FetchFailure::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(FetchFailure::Status(404).to_string(), "HTTP 404");
        assert_eq!(FetchFailure::Timeout.to_string(), "request timeout");
    }
}
