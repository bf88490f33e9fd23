use crate::config::types::{AppConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
///
/// App name and website URL may still be empty here; a config file is
/// allowed to leave them to the command line. Use [`validate_for_run`]
/// once all sources have been merged.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_app_config(&config.app)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates a fully merged configuration right before crawling
pub fn validate_for_run(config: &Config) -> ConfigResult<()> {
    validate(config)?;

    if config.app.app_name.trim().is_empty() {
        return Err(ConfigError::Validation("app_name is required".to_string()));
    }

    if config.app.website_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "website_url is required".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 64, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    if let Some(proxy) = config.proxy_url.as_deref().filter(|p| !p.is_empty()) {
        validate_http_url("proxy_url", proxy)?;
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates app metadata
fn validate_app_config(config: &AppConfig) -> ConfigResult<()> {
    validate_package_name(&config.package_name)?;

    if !config.website_url.trim().is_empty() {
        validate_http_url("website_url", &config.website_url)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a reverse-domain package name such as `com.example.app`
fn validate_package_name(name: &str) -> ConfigResult<()> {
    let segments: Vec<&str> = name.split('.').collect();

    if segments.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "package_name must have at least two dot-separated segments, got '{}'",
            name
        )));
    }

    for segment in segments {
        let mut chars = segment.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

        if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Validation(format!(
                "Invalid package_name segment '{}' in '{}'",
                segment, name
            )));
        }
    }

    Ok(())
}

/// Validates that a value is an absolute HTTP(S) URL
fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            field, value
        )));
    }

    Ok(())
}
