//! Configuration module for Gallery-Harvest
//!
//! Settings come from built-in defaults, an optional TOML file, the
//! `TARGET_URL` environment variable, and finally command-line overrides.
//! Only the target URL is required.
//!
//! # Example
//!
//! ```no_run
//! use gallery_harvest::config::{apply_env_overrides, load_config, validate};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("harvest.toml")).unwrap();
//! apply_env_overrides(&mut config);
//! validate(&config).unwrap();
//! println!("Crawling at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, PageFailurePolicy, SelectorConfig, UserAgentConfig,
    DEFAULT_LISTING_ITEM_SELECTOR, DEFAULT_MEDIA_CONTAINER_SELECTOR, TARGET_URL_ENV,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, apply_env_with, compute_config_hash, load_config, load_config_with_hash,
};
pub use validation::validate;
