use crate::browser::PageSelectors;
use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig, TARGET_URL_ENV};
use crate::url::listing_page_url;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Must run after every configuration source has been applied, since the
/// target URL is mandatory.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_url(config)?;
    validate_crawler_config(&config.crawler)?;
    validate_selectors(config)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates that the target URL is present and forms valid page URLs
fn validate_target_url(config: &Config) -> Result<(), ConfigError> {
    let target_url = config
        .target_url()
        .ok_or(ConfigError::MissingSetting(TARGET_URL_ENV))?;

    let first_page = listing_page_url(target_url, 1)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid target URL: {}", e)))?;

    if first_page.scheme() != "http" && first_page.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Target URL '{}' must use HTTP or HTTPS",
            target_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1, got 0".to_string(),
        ));
    }

    if config.render_timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "render_timeout_seconds must be >= 1".to_string(),
        ));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.request_timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_seconds must be >= 1".to_string(),
        ));
    }

    if config.max_run_seconds == Some(0) {
        return Err(ConfigError::Validation(
            "max_run_seconds must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that both selectors compile
fn validate_selectors(config: &Config) -> Result<(), ConfigError> {
    PageSelectors::new(
        &config.selectors.listing_item,
        &config.selectors.media_container,
    )
    .map_err(|e| ConfigError::Validation(e.to_string()))?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
