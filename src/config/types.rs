use serde::Deserialize;

/// Main configuration structure for SitePack
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of asset fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// Upper bound on a single fetch, in milliseconds
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Prefix for cross-origin requests; the target URL is appended percent-encoded.
    /// An empty string sends cross-origin requests directly.
    #[serde(rename = "proxy-url")]
    pub proxy_url: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 6,
            fetch_timeout_ms: 15_000,
            proxy_url: Some("https://api.allorigins.win/raw?url=".to_string()),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SitePack".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Metadata for the packaged app
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display name of the app
    #[serde(rename = "app-name")]
    pub app_name: String,

    /// Reverse-domain package identifier
    #[serde(rename = "package-name")]
    pub package_name: String,

    /// Website the app wraps; also the crawl seed
    #[serde(rename = "website-url")]
    pub website_url: String,

    /// Recorded in the generated files; the crawl itself always stays on the seed page
    #[serde(rename = "include-all-pages")]
    pub include_all_pages: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            package_name: "com.webtoapp.converter".to_string(),
            website_url: String::new(),
            include_all_pages: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the archive is written to
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Also write the app build configuration next to the archive
    #[serde(rename = "write-build-config")]
    pub write_build_config: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            write_build_config: false,
        }
    }
}
