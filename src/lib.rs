//! Gallery-Harvest: a listing-to-disk image harvester
//!
//! This crate walks a paginated product listing, opens each product's detail
//! page, extracts the images embedded in its media containers, and saves them
//! to a local directory under deterministic file names.

pub mod browser;
pub mod config;
pub mod harvest;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

pub use browser::BrowserError;

/// Main error type for Gallery-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Failed to load listing page {page}: {source}")]
    PageLoad { page: u32, source: BrowserError },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Required setting {0} is not set")]
    MissingSetting(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no item identifier in its path: {0}")]
    MissingIdentifier(String),
}

/// Result type alias for Gallery-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{run_harvest, Orchestrator};
pub use output::CrawlStats;
pub use state::{RunOutcome, RunPhase};
