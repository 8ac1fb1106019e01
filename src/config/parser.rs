use crate::config::types::{Config, TARGET_URL_ENV};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Missing sections and keys fall back to their defaults. The result is not
/// validated yet, because the target URL may still come from the environment
/// or the command line; call [`crate::config::validate`] once all sources
/// have been applied.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gallery_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be compared.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies settings from the process environment
///
/// `TARGET_URL`, when set and non-empty, replaces the configured target URL.
pub fn apply_env_overrides(config: &mut Config) {
    apply_env_with(config, |key| std::env::var(key).ok());
}

/// Same as [`apply_env_overrides`] with an explicit variable lookup
pub fn apply_env_with<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(target_url) = lookup(TARGET_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Using {} from environment", TARGET_URL_ENV);
        config.crawler.target_url = Some(target_url);
    }
}
