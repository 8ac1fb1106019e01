//! Detail page visits
//!
//! Each visit runs in its own browsing context which is closed on every exit
//! path, so the caller's listing context is never disturbed.

use crate::browser::{Browser, BrowsingContext, PageSelectors, RenderedPage};
use crate::harvest::{
    AssetDownloader, DownloadOutcome, HarvestEvent, ListingItem, MediaExtractor, MediaReference,
    Recorder, VisitSummary,
};
use crate::output::asset_path;
use crate::HarvestError;
use std::path::PathBuf;
use std::time::Duration;

/// Opens a product page, extracts its images, and downloads them in order
pub struct DetailPageVisitor {
    selectors: PageSelectors,
    extractor: MediaExtractor,
    downloader: AssetDownloader,
    output_dir: PathBuf,
    render_timeout: Duration,
    download_delay: Duration,
}

impl DetailPageVisitor {
    pub fn new(
        selectors: PageSelectors,
        downloader: AssetDownloader,
        output_dir: impl Into<PathBuf>,
        render_timeout: Duration,
        download_delay: Duration,
    ) -> Self {
        Self {
            selectors,
            extractor: MediaExtractor,
            downloader,
            output_dir: output_dir.into(),
            render_timeout,
            download_delay,
        }
    }

    /// Visits one item's detail page
    ///
    /// A page without media containers yields an empty summary, not an error.
    /// Errors are returned only when the page itself cannot be opened or read;
    /// per-image problems are counted in the summary instead.
    pub async fn visit<B: Browser>(
        &self,
        browser: &B,
        item: &ListingItem,
        recorder: &mut Recorder,
    ) -> Result<VisitSummary, HarvestError> {
        let mut context = browser.new_context().await?;

        let result = self.visit_in(&mut context, item, recorder).await;

        if let Err(e) = browser.close_context(context).await {
            tracing::warn!("Failed to close detail context for {}: {}", item.item_id, e);
        }

        result
    }

    async fn visit_in<C: BrowsingContext>(
        &self,
        context: &mut C,
        item: &ListingItem,
        recorder: &mut Recorder,
    ) -> Result<VisitSummary, HarvestError> {
        context.navigate(&item.detail_url).await?;

        let rendered = context
            .wait_for_selector(self.selectors.media_container_css(), self.render_timeout)
            .await?;
        if !rendered {
            recorder.emit(HarvestEvent::NoMedia {
                item_id: item.item_id.clone(),
                url: item.detail_url.clone(),
            });
            return Ok(VisitSummary::default());
        }

        let html = context.rendered_html().await?;
        let references = self.extract(&html, context, item);

        let mut summary = VisitSummary {
            media_count: references.len(),
            ..VisitSummary::default()
        };

        // The delay separates requests, so it only precedes a reference that
        // will be fetched and only after an earlier fetch.
        let mut fetched_any = false;
        for reference in &references {
            let will_fetch = !reference.source_url.trim().is_empty();
            if will_fetch && fetched_any && !self.download_delay.is_zero() {
                tokio::time::sleep(self.download_delay).await;
            }
            fetched_any |= will_fetch;

            self.download_one(item, reference, &mut summary, recorder)
                .await;
        }

        recorder.emit(HarvestEvent::ItemFinished {
            item_id: item.item_id.clone(),
            saved: summary.saved,
            failed: summary.failed,
        });

        Ok(summary)
    }

    fn extract<C: BrowsingContext>(
        &self,
        html: &str,
        context: &C,
        item: &ListingItem,
    ) -> Vec<MediaReference> {
        let base_url = context
            .current_url()
            .cloned()
            .unwrap_or_else(|| item.detail_url.clone());
        let page = RenderedPage::parse(html, base_url, &self.selectors);
        self.extractor.extract(&page)
    }

    async fn download_one(
        &self,
        item: &ListingItem,
        reference: &MediaReference,
        summary: &mut VisitSummary,
        recorder: &mut Recorder,
    ) {
        let destination = asset_path(
            &self.output_dir,
            &item.item_id,
            &item.item_name,
            reference.ordinal_index,
        );

        let result = self
            .downloader
            .download(&reference.source_url, &destination)
            .await;

        match result.outcome {
            DownloadOutcome::Saved { bytes } => {
                summary.saved += 1;
                recorder.emit(HarvestEvent::AssetSaved {
                    item_id: item.item_id.clone(),
                    ordinal: reference.ordinal_index,
                    path: result.destination_path,
                    bytes,
                });
            }
            DownloadOutcome::Skipped(reason) => {
                summary.skipped += 1;
                recorder.emit(HarvestEvent::AssetSkipped {
                    item_id: item.item_id.clone(),
                    ordinal: reference.ordinal_index,
                    reason: reason.to_string(),
                });
            }
            DownloadOutcome::Failed(error) => {
                summary.failed += 1;
                recorder.emit(HarvestEvent::AssetFailed {
                    item_id: item.item_id.clone(),
                    ordinal: reference.ordinal_index,
                    url: reference.source_url.clone(),
                    error,
                });
            }
        }
    }
}
