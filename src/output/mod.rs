//! Output module for harvest results
//!
//! This module handles:
//! - The on-disk layout of downloaded images
//! - Aggregate crawl statistics and the end-of-run summary

mod layout;
pub mod stats;

pub use layout::{asset_file_name, asset_path, prepare_output_dir, ASSET_EXTENSION};
pub use stats::{print_statistics, CrawlStats};
