//! Harvest pipeline
//!
//! This module contains the crawl-and-extract logic, leaf first:
//! - `AssetDownloader`: one image to one file
//! - `MediaExtractor`: image references from a rendered detail page
//! - `DetailPageVisitor`: one product page in its own context
//! - `ListingPaginator`: listing pages and their product links
//! - `Orchestrator`: the paging loop, limits, and session lifecycle

mod downloader;
mod events;
mod extractor;
mod orchestrator;
mod paginator;
mod recorder;
mod types;
mod visitor;

pub use downloader::AssetDownloader;
pub use events::{EventLog, EventSink, HarvestEvent, TracingSink};
pub use extractor::MediaExtractor;
pub use orchestrator::{
    register_interrupt, run_harvest, HarvestSettings, InterruptAction, Orchestrator,
};
pub use paginator::{collect_items, ListingPaginator};
pub use recorder::Recorder;
pub use types::{
    DownloadOutcome, DownloadResult, ListingItem, ListingPage, MediaReference, PageFetch,
    SkipReason, VisitSummary,
};
pub use visitor::DetailPageVisitor;
