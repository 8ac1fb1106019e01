//! Listing pagination
//!
//! Page `n` lives at the base URL plus `page=<n>`. A page that renders no
//! listing items within the render timeout marks the end of the listing.

use crate::browser::{BrowsingContext, PageReader, PageSelectors, RenderedPage};
use crate::harvest::{HarvestEvent, ListingItem, ListingPage, PageFetch, Recorder};
use crate::url::listing_page_url;
use crate::HarvestError;
use std::time::Duration;

/// Walks listing pages one at a time inside the listing context
pub struct ListingPaginator {
    base_url: String,
    selectors: PageSelectors,
    render_timeout: Duration,
}

impl ListingPaginator {
    pub fn new(base_url: impl Into<String>, selectors: PageSelectors, render_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            selectors,
            render_timeout,
        }
    }

    /// Loads page `page_number` and extracts its items
    ///
    /// # Returns
    ///
    /// * `Ok(PageFetch::Page(_))` - at least one listing item rendered
    /// * `Ok(PageFetch::EndOfListing)` - no item rendered before the timeout
    /// * `Err(HarvestError::PageLoad { .. })` - navigation or render failed
    pub async fn next_page<C: BrowsingContext>(
        &self,
        context: &mut C,
        page_number: u32,
        recorder: &mut Recorder,
    ) -> Result<PageFetch, HarvestError> {
        let page_url = listing_page_url(&self.base_url, page_number)?;
        recorder.emit(HarvestEvent::PageRequested {
            page: page_number,
            url: page_url.clone(),
        });

        let page_load = |source| HarvestError::PageLoad {
            page: page_number,
            source,
        };

        context.navigate(&page_url).await.map_err(page_load)?;

        let rendered = context
            .wait_for_selector(self.selectors.listing_item_css(), self.render_timeout)
            .await
            .map_err(page_load)?;
        if !rendered {
            return Ok(PageFetch::EndOfListing);
        }

        let html = context.rendered_html().await.map_err(page_load)?;
        let base_url = context.current_url().cloned().unwrap_or(page_url);
        let reader = RenderedPage::parse(&html, base_url, &self.selectors);

        Ok(PageFetch::Page(collect_items(page_number, &reader, recorder)))
    }
}

/// Builds a listing page from the item links of a rendered page
///
/// Entries without a link, or whose link carries no item identity, are
/// skipped individually; the rest of the page is still used.
pub fn collect_items<R: PageReader + ?Sized>(
    page_number: u32,
    reader: &R,
    recorder: &mut Recorder,
) -> ListingPage {
    let mut items = Vec::new();
    let mut skipped = 0;

    for (position, link) in reader.find_item_links().into_iter().enumerate() {
        let Some(href) = link else {
            skipped += 1;
            recorder.emit(HarvestEvent::ItemSkipped {
                page: page_number,
                reason: format!("entry {} has no product link", position + 1),
            });
            continue;
        };

        match ListingItem::from_href(&href) {
            Ok(item) => items.push(item),
            Err(e) => {
                skipped += 1;
                recorder.emit(HarvestEvent::ItemSkipped {
                    page: page_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    ListingPage {
        page_number,
        items,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeBrowser;
    use crate::browser::Browser;
    use crate::harvest::EventLog;
    use std::sync::Arc;

    struct StubReader(Vec<Option<String>>);

    impl PageReader for StubReader {
        fn find_item_links(&self) -> Vec<Option<String>> {
            self.0.clone()
        }

        fn find_media_sources(&self) -> Vec<Option<String>> {
            Vec::new()
        }
    }

    fn recorder() -> (Recorder, EventLog) {
        let log = EventLog::new();
        (Recorder::new(Arc::new(log.clone())), log)
    }

    fn paginator() -> ListingPaginator {
        ListingPaginator::new(
            "https://shop.example/list?",
            PageSelectors::new(".item", "picture").unwrap(),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn test_missing_href_skipped_and_rest_kept() {
        let (mut recorder, log) = recorder();
        let reader = StubReader(vec![
            None,
            Some("https://shop.example/product/dkp-1/chair".to_string()),
            Some("https://shop.example/about".to_string()),
            Some("https://shop.example/product/dkp-2/desk".to_string()),
        ]);

        let page = collect_items(4, &reader, &mut recorder);

        assert_eq!(page.page_number, 4);
        assert_eq!(page.skipped, 2);
        let ids: Vec<&str> = page.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["dkp-1", "dkp-2"]);
        assert_eq!(log.count("item_skipped"), 2);
        assert_eq!(recorder.stats().items_skipped, 2);
    }

    #[tokio::test]
    async fn test_page_with_items() {
        let browser = FakeBrowser::new(vec![(
            "https://shop.example/list?page=1",
            Ok(r#"<div class="item"><a href="/product/dkp-1/chair">x</a></div>
                  <div class="item"><a href="/product/dkp-2/desk">y</a></div>"#),
        )]);
        let mut context = browser.new_context().await.unwrap();
        let (mut recorder, _) = recorder();

        let fetch = paginator()
            .next_page(&mut context, 1, &mut recorder)
            .await
            .unwrap();

        let PageFetch::Page(page) = fetch else {
            panic!("expected a page");
        };
        assert_eq!(page.items.len(), 2);
        assert_eq!(
            page.items[0].detail_url.as_str(),
            "https://shop.example/product/dkp-1/chair"
        );
        assert_eq!(page.items[1].item_name, "desk");
    }

    #[tokio::test]
    async fn test_zero_items_is_end_of_listing() {
        let browser = FakeBrowser::new(vec![(
            "https://shop.example/list?page=7",
            Ok("<html><body><p>Nothing here</p></body></html>"),
        )]);
        let mut context = browser.new_context().await.unwrap();
        let (mut recorder, _) = recorder();

        let fetch = paginator()
            .next_page(&mut context, 7, &mut recorder)
            .await
            .unwrap();

        assert_eq!(fetch, PageFetch::EndOfListing);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_page_load_error() {
        let browser = FakeBrowser::new(vec![("https://shop.example/list?page=1", Err(500))]);
        let mut context = browser.new_context().await.unwrap();
        let (mut recorder, _) = recorder();

        let result = paginator().next_page(&mut context, 1, &mut recorder).await;

        assert!(matches!(result, Err(HarvestError::PageLoad { page: 1, .. })));
    }
}
