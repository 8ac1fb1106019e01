//! Aggregate counters for a harvest run
//!
//! Counters are only ever incremented, from the event stream, and read once
//! the run has finished.

use crate::harvest::HarvestEvent;
use crate::state::RunOutcome;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Listing pages that rendered at least one item
    pub pages_visited: u64,

    /// Listing pages that failed to load
    pub pages_failed: u64,

    /// Products whose detail page was visited
    pub items_processed: u64,

    /// Listing entries without a usable link
    pub items_skipped: u64,

    /// Products whose visit aborted with an error
    pub items_failed: u64,

    pub assets_saved: u64,
    pub assets_skipped: u64,
    pub assets_failed: u64,
    pub bytes_saved: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<RunOutcome>,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            pages_visited: 0,
            pages_failed: 0,
            items_processed: 0,
            items_skipped: 0,
            items_failed: 0,
            assets_saved: 0,
            assets_skipped: 0,
            assets_failed: 0,
            bytes_saved: 0,
            started_at: Utc::now(),
            finished_at: None,
            outcome: None,
        }
    }

    /// Updates counters for one event
    pub fn record(&mut self, event: &HarvestEvent) {
        match event {
            HarvestEvent::PageVisited { .. } => self.pages_visited += 1,
            HarvestEvent::PageLoadFailed { .. } => self.pages_failed += 1,
            HarvestEvent::ItemStarted { .. } => self.items_processed += 1,
            HarvestEvent::ItemSkipped { .. } => self.items_skipped += 1,
            HarvestEvent::ItemFailed { .. } => self.items_failed += 1,
            HarvestEvent::AssetSaved { bytes, .. } => {
                self.assets_saved += 1;
                self.bytes_saved += bytes;
            }
            HarvestEvent::AssetSkipped { .. } => self.assets_skipped += 1,
            HarvestEvent::AssetFailed { .. } => self.assets_failed += 1,
            HarvestEvent::PageRequested { .. }
            | HarvestEvent::EndOfListing { .. }
            | HarvestEvent::NoMedia { .. }
            | HarvestEvent::ItemFinished { .. } => {}
        }
    }

    /// Stamps the end time and the reason the run stopped
    pub fn finish(&mut self, outcome: RunOutcome) {
        self.finished_at = Some(Utc::now());
        self.outcome = Some(outcome);
    }

    /// Returns true if the run ended abnormally
    pub fn is_failure(&self) -> bool {
        self.outcome.as_ref().is_some_and(RunOutcome::is_failure)
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    match &stats.outcome {
        Some(outcome) => println!("  Outcome: {}", outcome),
        None => println!("  Outcome: unfinished"),
    }
    println!();

    println!("Listing:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages failed: {}", stats.pages_failed);
    println!();

    println!("Products:");
    println!("  Processed: {}", stats.items_processed);
    println!("  Skipped: {}", stats.items_skipped);
    println!("  Failed: {}", stats.items_failed);
    println!();

    println!("Images:");
    println!("  Saved: {} ({} bytes)", stats.assets_saved, stats.bytes_saved);
    println!("  Skipped: {}", stats.assets_skipped);
    println!("  Failed: {}", stats.assets_failed);
    println!();

    let attempted = stats.assets_saved + stats.assets_failed;
    let success_rate = if attempted > 0 {
        (stats.assets_saved as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} downloads saved)",
        success_rate, stats.assets_saved, attempted
    );
}
