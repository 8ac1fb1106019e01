//! Structured events emitted while harvesting
//!
//! Every user-visible action produces one [`HarvestEvent`]. The orchestrator
//! feeds each event both to [`crate::output::CrawlStats`] and to an
//! [`EventSink`], so log output and counters always agree.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    // ===== Listing =====
    PageRequested { page: u32, url: Url },
    PageVisited { page: u32, items: usize, skipped: usize },
    PageLoadFailed { page: u32, error: String },
    EndOfListing { page: u32 },

    // ===== Items =====
    ItemStarted { ordinal: u64, item_id: String, item_name: String },
    ItemSkipped { page: u32, reason: String },
    ItemFailed { item_id: String, error: String },
    NoMedia { item_id: String, url: Url },
    ItemFinished { item_id: String, saved: usize, failed: usize },

    // ===== Assets =====
    AssetSaved { item_id: String, ordinal: usize, path: PathBuf, bytes: u64 },
    AssetSkipped { item_id: String, ordinal: usize, reason: String },
    AssetFailed { item_id: String, ordinal: usize, url: String, error: String },
}

impl HarvestEvent {
    /// Stable name of the event variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageRequested { .. } => "page_requested",
            Self::PageVisited { .. } => "page_visited",
            Self::PageLoadFailed { .. } => "page_load_failed",
            Self::EndOfListing { .. } => "end_of_listing",
            Self::ItemStarted { .. } => "item_started",
            Self::ItemSkipped { .. } => "item_skipped",
            Self::ItemFailed { .. } => "item_failed",
            Self::NoMedia { .. } => "no_media",
            Self::ItemFinished { .. } => "item_finished",
            Self::AssetSaved { .. } => "asset_saved",
            Self::AssetSkipped { .. } => "asset_skipped",
            Self::AssetFailed { .. } => "asset_failed",
        }
    }
}

/// Receives harvest events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &HarvestEvent);
}

/// Writes each event as one log line
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &HarvestEvent) {
        match event {
            HarvestEvent::PageRequested { page, url } => {
                tracing::info!("Navigating to page {}: {}", page, url)
            }
            HarvestEvent::PageVisited {
                page,
                items,
                skipped,
            } => tracing::info!(
                "Page {}: {} items found ({} skipped)",
                page,
                items,
                skipped
            ),
            HarvestEvent::PageLoadFailed { page, error } => {
                tracing::error!("Error on page {}: {}", page, error)
            }
            HarvestEvent::EndOfListing { page } => {
                tracing::info!("No products found on page {}, stopping", page)
            }
            HarvestEvent::ItemStarted {
                ordinal,
                item_id,
                item_name,
            } => tracing::info!(
                "Processing product {}: {} with ID {}",
                ordinal,
                item_name,
                item_id
            ),
            HarvestEvent::ItemSkipped { page, reason } => {
                tracing::warn!("Skipping product on page {}: {}", page, reason)
            }
            HarvestEvent::ItemFailed { item_id, error } => {
                tracing::error!("Error processing product {}: {}", item_id, error)
            }
            HarvestEvent::NoMedia { item_id, url } => {
                tracing::info!("No pictures found for {} ({})", item_id, url)
            }
            HarvestEvent::ItemFinished {
                item_id,
                saved,
                failed,
            } => tracing::debug!(
                "Finished product {}: {} saved, {} failed",
                item_id,
                saved,
                failed
            ),
            HarvestEvent::AssetSaved { path, bytes, .. } => {
                tracing::info!("Image saved as {} ({} bytes)", path.display(), bytes)
            }
            HarvestEvent::AssetSkipped {
                item_id,
                ordinal,
                reason,
            } => tracing::warn!(
                "Image {} of product {} skipped: {}",
                ordinal + 1,
                item_id,
                reason
            ),
            HarvestEvent::AssetFailed {
                item_id,
                ordinal,
                url,
                error,
            } => tracing::error!(
                "Error downloading image {} of product {} from {}: {}",
                ordinal + 1,
                item_id,
                url,
                error
            ),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<HarvestEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<HarvestEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of events of the given kind
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| e.kind() == kind).count())
            .unwrap_or(0)
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &HarvestEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
