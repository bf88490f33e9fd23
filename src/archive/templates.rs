//! Generated files placed at the top of every archive
//!
//! Entry page, web app manifest, service worker, readme, icons and the
//! Android build configuration.

use crate::archive::format_file_size;
use crate::config::AppConfig;
use crate::crawler::CrawlResult;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Escapes text for use in HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Mobile entry page showing the archive's root asset in a full-screen viewer
pub fn entry_page(app: &AppConfig, root_path: &str) -> String {
    let name = escape_html(&app.app_name);
    let root = escape_html(root_path);
    let website = escape_html(&app.website_url);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="apple-mobile-web-app-capable" content="yes">
  <meta name="apple-mobile-web-app-status-bar-style" content="default">
  <meta name="apple-mobile-web-app-title" content="{name}">
  <title>{name}</title>
  <link rel="manifest" href="manifest.json">
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; height: 100vh; display: flex; flex-direction: column; background: #f8fafc; }}
    .app-header {{ background: linear-gradient(135deg, #0284c7 0%, #0369a1 100%); color: white; padding: 1rem; text-align: center; }}
    .app-header h1 {{ font-size: 1.2rem; font-weight: 600; }}
    .content-frame {{ flex: 1; display: flex; flex-direction: column; position: relative; }}
    .loading {{ position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); text-align: center; }}
    .offline-message {{ padding: 2rem; text-align: center; color: #64748b; display: none; }}
    iframe {{ border: none; width: 100%; height: 100%; background: white; }}
  </style>
</head>
<body>
  <div class="app-header">
    <h1>{name}</h1>
  </div>
  <div class="content-frame">
    <div class="loading"><p>Loading website content...</p></div>
    <div class="offline-message">
      <h3>Content Unavailable</h3>
      <p>Unable to load <a href="{website}">{website}</a>.</p>
    </div>
    <iframe
      src="{root}"
      onload="document.querySelector('.loading').style.display = 'none'"
      onerror="document.querySelector('.loading').style.display = 'none'; document.querySelector('.offline-message').style.display = 'block'"
    ></iframe>
  </div>
  <script>
    if ('serviceWorker' in navigator) {{
      navigator.serviceWorker.register('sw.js').catch(() => {{}});
    }}
  </script>
</body>
</html>
"#
    )
}

#[derive(Serialize)]
struct Manifest<'a> {
    name: &'a str,
    short_name: &'a str,
    description: String,
    package_name: &'a str,
    start_url: &'a str,
    display: &'a str,
    orientation: &'a str,
    background_color: &'a str,
    theme_color: &'a str,
    categories: [&'a str; 2],
    icons: [ManifestIcon<'a>; 2],
    include_all_pages: bool,
}

#[derive(Serialize)]
struct ManifestIcon<'a> {
    src: &'a str,
    sizes: &'a str,
    #[serde(rename = "type")]
    media_type: &'a str,
    purpose: &'a str,
}

/// Web app manifest describing the packaged app
pub fn manifest(app: &AppConfig) -> Result<String, serde_json::Error> {
    let manifest = Manifest {
        name: &app.app_name,
        short_name: &app.app_name,
        description: format!("Mobile app for {}", app.website_url),
        package_name: &app.package_name,
        start_url: "/",
        display: "standalone",
        orientation: "portrait-primary",
        background_color: "#ffffff",
        theme_color: "#0284c7",
        categories: ["productivity", "utilities"],
        icons: [
            ManifestIcon {
                src: "icon-192.png",
                sizes: "192x192",
                media_type: "image/png",
                purpose: "maskable any",
            },
            ManifestIcon {
                src: "icon-512.png",
                sizes: "512x512",
                media_type: "image/png",
                purpose: "maskable any",
            },
        ],
        include_all_pages: app.include_all_pages,
    };

    serde_json::to_string_pretty(&manifest)
}

/// Cache-first service worker precaching every archived path
pub fn service_worker<'a>(paths: impl IntoIterator<Item = &'a str>) -> Result<String, serde_json::Error> {
    let mut urls = vec!["/".to_string()];
    urls.extend(paths.into_iter().map(|p| format!("/{}", p)));
    let urls = serde_json::to_string_pretty(&urls)?;

    Ok(format!(
        r#"const CACHE_NAME = 'app-cache-v1';
const urlsToCache = {urls};

self.addEventListener('install', event => {{
  event.waitUntil(
    caches.open(CACHE_NAME).then(cache => cache.addAll(urlsToCache))
  );
}});

self.addEventListener('fetch', event => {{
  event.respondWith(
    caches.match(event.request).then(response => response || fetch(event.request))
  );
}});
"#
    ))
}

/// Human-readable summary of the archive
pub fn readme(app: &AppConfig, result: &CrawlResult, generated_at: DateTime<Utc>) -> String {
    format!(
        r#"# {name}

Generated by SitePack

## Website Information
- **Source URL:** {url}
- **Total Size:** {size}
- **Pages Crawled:** {pages}
- **Assets Downloaded:** {assets}
- **Include All Pages:** {all_pages}

## Installation Instructions

### As a Web App
1. Extract this ZIP file
2. Open `index.html` in a web browser

### Deploy to Web Server
1. Extract all files to your web server
2. Access via your domain
3. The app will work offline after first visit

### Mobile Installation
1. Open the website on a mobile device
2. Add to home screen when prompted

## Files Included
- `index.html` - Main application file
- `manifest.json` - Web app manifest
- `sw.js` - Service worker for offline support
- Downloaded website assets and pages

Generated on: {date}
"#,
        name = app.app_name,
        url = app.website_url,
        size = format_file_size(result.total_size_bytes),
        pages = result.page_count,
        assets = result.asset_count(),
        all_pages = if app.include_all_pages { "Yes" } else { "No" },
        date = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Square SVG icon showing the app's initial
pub fn icon(app_name: &str, size: u32) -> String {
    let initial = app_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    let initial = escape_html(&initial);
    let center = size / 2;
    let font_size = size / 10 + 1;

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
  <rect width="{size}" height="{size}" fill="#0284c7"/>
  <text x="{center}" y="{center}" text-anchor="middle" dominant-baseline="central" fill="white" font-family="Arial" font-size="{font_size}" font-weight="bold">{initial}</text>
</svg>
"##
    )
}

/// Android build configuration for turning the archive into an APK
pub fn build_config(app: &AppConfig, total_size_bytes: u64, generated_at: DateTime<Utc>) -> String {
    let project = app.app_name.split_whitespace().collect::<String>();

    format!(
        r#"# Android APK Configuration
# Generated by SitePack

app_name={name}
package_name={package}
website_url={url}
include_all_pages={all_pages}
total_size={size}
generation_date={date}

# Build Commands (example):
# cordova create {project} {package} "{name}"
# cd {project}
# cordova platform add android
# cordova build android
"#,
        name = app.app_name,
        package = app.package_name,
        url = app.website_url,
        all_pages = app.include_all_pages,
        size = format_file_size(total_size_bytes),
        date = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}
