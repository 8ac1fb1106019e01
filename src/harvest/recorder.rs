use crate::harvest::{EventSink, HarvestEvent};
use crate::output::CrawlStats;
use std::sync::Arc;

/// Single path for harvest events: counts them, then forwards them
pub struct Recorder {
    stats: CrawlStats,
    sink: Arc<dyn EventSink>,
}

impl Recorder {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            stats: CrawlStats::new(),
            sink,
        }
    }

    pub fn emit(&mut self, event: HarvestEvent) {
        self.stats.record(&event);
        self.sink.emit(&event);
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn into_stats(self) -> CrawlStats {
        self.stats
    }
}
