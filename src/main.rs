//! SitePack main entry point
//!
//! This is the command-line interface for the SitePack site packager.

use clap::Parser;
use sitepack::archive::{build_config, safe_name, Archive, ArchiveBuilder};
use sitepack::config::{load_config_with_hash, validate_for_run, Config};
use sitepack::crawler::{Coordinator, CrawlResult, Progress};
use sitepack::format_file_size;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// SitePack: website to offline app packager
///
/// SitePack downloads a website's page together with the stylesheets,
/// scripts, images and fonts it references, and packages everything into
/// a ZIP archive ready to be installed as a web app.
#[derive(Parser, Debug)]
#[command(name = "sitepack")]
#[command(version)]
#[command(about = "Package a website into an offline app archive", long_about = None)]
struct Cli {
    /// Website to package (overrides app.website-url)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Display name of the app
    #[arg(long)]
    app_name: Option<String>,

    /// Reverse-domain package identifier
    #[arg(long)]
    package_name: Option<String>,

    /// Record whether the app should include all pages
    #[arg(long, value_name = "BOOL")]
    include_all_pages: Option<bool>,

    /// Directory the archive is written to
    #[arg(long, value_name = "DIR", conflicts_with = "output")]
    output_dir: Option<PathBuf>,

    /// Exact path of the archive file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write the Android build configuration file
    #[arg(long)]
    build_config: bool,

    /// Maximum number of asset downloads in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Proxy prefix for cross-origin requests
    #[arg(long, value_name = "URL", conflicts_with = "no_proxy")]
    proxy: Option<String>,

    /// Send cross-origin requests directly
    #[arg(long)]
    no_proxy: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);

    if let Err(e) = validate_for_run(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let output_path = cli.output.clone().unwrap_or_else(|| {
        Path::new(&config.output.output_dir).join(Archive::suggested_filename(&config.app.app_name))
    });

    handle_package(&config, &output_path).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitepack=info,warn"),
            1 => EnvFilter::new("sitepack=debug,info"),
            2 => EnvFilter::new("sitepack=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges command-line flags over file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.app.website_url = url.clone();
    }
    if let Some(name) = &cli.app_name {
        config.app.app_name = name.clone();
    }
    if let Some(package) = &cli.package_name {
        config.app.package_name = package.clone();
    }
    if let Some(all_pages) = cli.include_all_pages {
        config.app.include_all_pages = all_pages;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.output_dir = dir.display().to_string();
    }
    if cli.build_config {
        config.output.write_build_config = true;
    }
    if let Some(n) = cli.concurrency {
        config.crawler.max_concurrent_fetches = n;
    }
    if let Some(ms) = cli.timeout_ms {
        config.crawler.fetch_timeout_ms = ms;
    }
    if let Some(proxy) = &cli.proxy {
        config.crawler.proxy_url = Some(proxy.clone());
    }
    if cli.no_proxy {
        config.crawler.proxy_url = None;
    }
}

/// Crawls the configured website and writes the archive
async fn handle_package(config: &Config, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Packaging {} as '{}'", config.app.website_url, config.app.app_name);

    let (progress, mut rx) = Progress::channel();
    let reporter = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            tracing::info!("{}", message);
        }
    });

    let coordinator = Coordinator::from_config(config)?;
    let result = match coordinator.crawl(&config.app.website_url, &progress).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let builder = ArchiveBuilder::new().progress(progress);
    let generated_at = builder.timestamp();
    let archive = match builder.build(&result, &config.app) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::error!("Archive build failed: {}", e);
            return Err(e.into());
        }
    };

    // Closes the channel so the reporter drains and exits
    drop(builder);
    let _ = reporter.await;

    write_file(output_path, &archive.bytes)?;
    tracing::info!("Archive written to: {}", output_path.display());

    if config.output.write_build_config {
        let name = format!("{}.app.properties", safe_name(&config.app.app_name));
        let path = output_path
            .parent()
            .map(|dir| dir.join(&name))
            .unwrap_or_else(|| PathBuf::from(&name));
        let text = build_config(&config.app, archive.total_size_bytes, generated_at);
        write_file(&path, text.as_bytes())?;
        tracing::info!("Build configuration written to: {}", path.display());
    }

    print_summary(&result, &archive, output_path);

    Ok(())
}

/// Writes a file, creating missing parent directories
fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, content)
}

/// Prints crawl and archive statistics
fn print_summary(result: &CrawlResult, archive: &Archive, output_path: &Path) {
    use sitepack::crawler::AssetStatus;

    println!("\n=== SitePack Summary ===\n");
    println!("Source: {}", result.base_url);
    println!("  Pages crawled: {}", archive.page_count);
    println!("  Assets: {}", archive.asset_count);
    println!("  Total size: {}", format_file_size(archive.total_size_bytes));

    let fallbacks = result.count_by_status(AssetStatus::Fallback);
    let placeholders = result.count_by_status(AssetStatus::Placeholder);
    if fallbacks + placeholders > 0 {
        println!("  Fallback pages: {}", fallbacks);
        println!("  Placeholder assets: {}", placeholders);
    }

    if !archive.warnings.is_empty() {
        println!("\nSkipped entries ({}):", archive.warnings.len());
        for warning in &archive.warnings {
            println!("  - {}", warning);
        }
    }

    println!("\nArchive: {}", output_path.display());
    println!("  Size: {}", format_file_size(archive.bytes.len() as u64));
    println!("  SHA-256: {}", archive.sha256());
}
