//! Harvest orchestrator - main crawl loop
//!
//! This module drives a whole run:
//! - Opening the listing context and paging through the listing
//! - Visiting every product found, isolating per-product failures
//! - Enforcing the page ceiling, run deadline, and cancellation
//! - Releasing the browser session exactly once when the run ends

use crate::browser::{build_http_client, Browser, HttpBrowser, PageSelectors};
use crate::config::{Config, PageFailurePolicy, TARGET_URL_ENV};
use crate::harvest::{
    AssetDownloader, DetailPageVisitor, EventSink, HarvestEvent, ListingPaginator, PageFetch,
    Recorder, TracingSink,
};
use crate::output::{prepare_output_dir, CrawlStats};
use crate::state::{RunOutcome, RunPhase};
use crate::ConfigError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Tunables shared by the paginator and the detail visitor
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub selectors: PageSelectors,
    pub render_timeout: Duration,
    pub download_delay: Duration,
    pub page_failure_policy: PageFailurePolicy,
    pub max_run_duration: Option<Duration>,
}

impl HarvestSettings {
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let selectors = PageSelectors::new(
            &config.selectors.listing_item,
            &config.selectors.media_container,
        )?;

        Ok(Self {
            selectors,
            render_timeout: config.crawler.render_timeout(),
            download_delay: config.crawler.download_delay(),
            page_failure_policy: config.crawler.on_page_failure,
            max_run_duration: config.crawler.max_run_duration(),
        })
    }
}

/// Stop conditions checked before every page and every item
struct RunLimits {
    deadline: Option<Instant>,
    cancel: Arc<AtomicBool>,
}

impl RunLimits {
    fn check(&self) -> Option<RunOutcome> {
        if self.cancel.load(Ordering::SeqCst) {
            tracing::warn!("Cancellation requested, stopping");
            return Some(RunOutcome::Cancelled);
        }

        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::warn!("Run deadline reached, stopping");
            return Some(RunOutcome::DeadlineExceeded);
        }

        None
    }
}

/// What an interrupt from the user should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Stop before the next page or item, releasing the browser session
    Stop,
    /// Exit immediately; the run already had a stop request
    ForceQuit,
}

/// Records one interrupt on the cancellation flag
///
/// The first interrupt asks the run to stop at the next check. Any later
/// one means the user is not willing to wait for that, e.g. during a long
/// render wait.
pub fn register_interrupt(cancel: &AtomicBool) -> InterruptAction {
    if cancel.swap(true, Ordering::SeqCst) {
        InterruptAction::ForceQuit
    } else {
        InterruptAction::Stop
    }
}

/// Main harvest driver
///
/// Owns the browsing session for the duration of [`Orchestrator::run`].
pub struct Orchestrator<B: Browser> {
    browser: B,
    downloader: AssetDownloader,
    settings: HarvestSettings,
    sink: Arc<dyn EventSink>,
    cancel: Arc<AtomicBool>,
}

impl<B: Browser> Orchestrator<B> {
    pub fn new(browser: B, downloader: AssetDownloader, settings: HarvestSettings) -> Self {
        Self {
            browser,
            downloader,
            settings,
            sink: Arc::new(TracingSink),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the default logging sink
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Uses `cancel` as the cancellation flag; setting it stops the run
    /// before the next page or item
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the harvest until the listing ends, `max_pages` pages have been
    /// visited, a listing page fails under the abort policy, or a stop
    /// condition fires
    ///
    /// Per-product and per-image failures never end the run. The browser
    /// session is shut down before this returns, whatever the outcome.
    pub async fn run(self, base_url: &str, output_dir: &Path, max_pages: u32) -> CrawlStats {
        let Self {
            browser,
            downloader,
            settings,
            sink,
            cancel,
        } = self;

        tracing::info!(
            "Starting harvest of {} (max {} pages) into {}",
            base_url,
            max_pages,
            output_dir.display()
        );

        let mut recorder = Recorder::new(sink);
        let mut phase = RunPhase::Init;
        let limits = RunLimits {
            deadline: settings.max_run_duration.map(|d| Instant::now() + d),
            cancel,
        };

        let paginator = ListingPaginator::new(
            base_url,
            settings.selectors.clone(),
            settings.render_timeout,
        );
        let visitor = DetailPageVisitor::new(
            settings.selectors.clone(),
            downloader,
            output_dir,
            settings.render_timeout,
            settings.download_delay,
        );

        let outcome = match browser.new_context().await {
            Ok(mut listing) => {
                let outcome = page_loop(
                    &browser,
                    &mut listing,
                    &paginator,
                    &visitor,
                    &limits,
                    settings.page_failure_policy,
                    max_pages,
                    &mut phase,
                    &mut recorder,
                )
                .await;

                if let Err(e) = browser.close_context(listing).await {
                    tracing::warn!("Failed to close listing context: {}", e);
                }
                outcome
            }
            Err(e) => {
                let error = format!("could not open listing context: {}", e);
                recorder.emit(HarvestEvent::PageLoadFailed {
                    page: 1,
                    error: error.clone(),
                });
                RunOutcome::PageLoadFailure { page: 1, error }
            }
        };

        phase.advance(RunPhase::Done(outcome.clone()));

        if let Err(e) = browser.shutdown().await {
            tracing::warn!("Browser shutdown failed: {}", e);
        }

        let mut stats = recorder.into_stats();
        stats.finish(outcome);

        tracing::info!(
            "Harvest finished ({}): {} pages, {} products, {} images saved, {} failed",
            stats.outcome.as_ref().map(RunOutcome::as_str).unwrap_or("unknown"),
            stats.pages_visited,
            stats.items_processed,
            stats.assets_saved,
            stats.assets_failed
        );

        stats
    }
}

#[allow(clippy::too_many_arguments)]
async fn page_loop<B: Browser>(
    browser: &B,
    listing: &mut B::Context,
    paginator: &ListingPaginator,
    visitor: &DetailPageVisitor,
    limits: &RunLimits,
    policy: PageFailurePolicy,
    max_pages: u32,
    phase: &mut RunPhase,
    recorder: &mut Recorder,
) -> RunOutcome {
    let mut item_ordinal: u64 = 0;

    for page_number in 1..=max_pages {
        if let Some(stop) = limits.check() {
            return stop;
        }
        phase.advance(RunPhase::PagingLoop { page: page_number });

        let page = match paginator.next_page(listing, page_number, recorder).await {
            Ok(PageFetch::Page(page)) => page,
            Ok(PageFetch::EndOfListing) => {
                recorder.emit(HarvestEvent::EndOfListing { page: page_number });
                return RunOutcome::EndOfListing { page: page_number };
            }
            Err(e) => {
                let error = e.to_string();
                recorder.emit(HarvestEvent::PageLoadFailed {
                    page: page_number,
                    error: error.clone(),
                });
                match policy {
                    PageFailurePolicy::Abort => {
                        return RunOutcome::PageLoadFailure {
                            page: page_number,
                            error,
                        }
                    }
                    PageFailurePolicy::SkipPage => continue,
                }
            }
        };

        recorder.emit(HarvestEvent::PageVisited {
            page: page.page_number,
            items: page.items.len(),
            skipped: page.skipped,
        });

        for item in &page.items {
            if let Some(stop) = limits.check() {
                return stop;
            }

            item_ordinal += 1;
            recorder.emit(HarvestEvent::ItemStarted {
                ordinal: item_ordinal,
                item_id: item.item_id.clone(),
                item_name: item.item_name.clone(),
            });

            if let Err(e) = visitor.visit(browser, item, recorder).await {
                recorder.emit(HarvestEvent::ItemFailed {
                    item_id: item.item_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    RunOutcome::PageCeiling { max_pages }
}

/// Runs a complete harvest from a validated configuration
///
/// This function wires the default engine together:
///
/// 1. Build the shared HTTP client from the user-agent settings
/// 2. Create the output directory
/// 3. Start an [`HttpBrowser`] session
/// 4. Run the [`Orchestrator`] until it stops
///
/// # Example
///
/// ```no_run
/// use gallery_harvest::config::{load_config, validate};
/// use gallery_harvest::harvest::run_harvest;
/// use std::path::Path;
/// use std::sync::atomic::AtomicBool;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// validate(&config)?;
/// let stats = run_harvest(&config, Arc::new(AtomicBool::new(false))).await?;
/// println!("{} images saved", stats.assets_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    cancel: Arc<AtomicBool>,
) -> crate::Result<CrawlStats> {
    let base_url = config
        .target_url()
        .ok_or(ConfigError::MissingSetting(TARGET_URL_ENV))?;
    let settings = HarvestSettings::from_config(config)?;

    let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
    prepare_output_dir(&config.output.output_dir)?;

    // Render polling re-fetches from the origin, so it is never more eager
    // than the pause between image downloads
    let poll_interval = config
        .crawler
        .poll_interval()
        .max(config.crawler.download_delay());
    let browser = HttpBrowser::new(client.clone(), poll_interval);
    let downloader = AssetDownloader::new(client);

    let stats = Orchestrator::new(browser, downloader, settings)
        .with_cancel_flag(cancel)
        .run(base_url, &config.output.output_dir, config.crawler.max_pages)
        .await;

    Ok(stats)
}
