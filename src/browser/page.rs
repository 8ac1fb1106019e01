//! Read-only view over a rendered document

use super::BrowserError;
use crate::url::{resolve_href, resolve_src};
use scraper::{Html, Selector};
use url::Url;

/// Narrow query interface over a rendered page
///
/// Both queries return one entry per matched container element, in document
/// order. An entry is `None` when the container exists but carries no usable
/// link or no image source at all.
pub trait PageReader {
    /// One entry per listing-item element: its anchor's absolute `href`
    fn find_item_links(&self) -> Vec<Option<String>>;

    /// One entry per media container: its image's `src`
    ///
    /// Resolvable sources are made absolute. A present but unresolvable
    /// source is kept as written; only a missing or blank one is `None`.
    fn find_media_sources(&self) -> Vec<Option<String>>;
}

/// Compiled selectors for the listing and detail DOM contracts
#[derive(Debug, Clone)]
pub struct PageSelectors {
    listing_item: Selector,
    item_link: Selector,
    media_container: Selector,
    media_image: Selector,
    listing_item_css: String,
    media_container_css: String,
}

impl PageSelectors {
    /// Compiles the two configurable container selectors
    ///
    /// Anchors are looked up as `a` inside a listing item and images as
    /// `img` inside a media container.
    pub fn new(listing_item: &str, media_container: &str) -> Result<Self, BrowserError> {
        Ok(Self {
            listing_item: parse_selector(listing_item)?,
            item_link: parse_selector("a")?,
            media_container: parse_selector(media_container)?,
            media_image: parse_selector("img")?,
            listing_item_css: listing_item.to_string(),
            media_container_css: media_container.to_string(),
        })
    }

    /// CSS text of the listing-item selector, for render waits
    pub fn listing_item_css(&self) -> &str {
        &self.listing_item_css
    }

    /// CSS text of the media-container selector, for render waits
    pub fn media_container_css(&self) -> &str {
        &self.media_container_css
    }
}

fn parse_selector(css: &str) -> Result<Selector, BrowserError> {
    Selector::parse(css).map_err(|_| BrowserError::Selector(css.to_string()))
}

/// Counts elements matching `selector` in `html`
pub fn count_matches(html: &str, selector: &str) -> Result<usize, BrowserError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).count())
}

/// A parsed snapshot of a rendered document
///
/// Attribute values are resolved against `base_url`, the way a browser
/// reports `href` and `src` properties.
pub struct RenderedPage<'a> {
    document: Html,
    base_url: Url,
    selectors: &'a PageSelectors,
}

impl<'a> RenderedPage<'a> {
    pub fn parse(html: &str, base_url: Url, selectors: &'a PageSelectors) -> Self {
        Self {
            document: Html::parse_document(html),
            base_url,
            selectors,
        }
    }

    fn nested_attr(
        &self,
        container: &Selector,
        nested: &Selector,
        attr: &str,
        resolve: fn(&str, &Url) -> Option<String>,
    ) -> Vec<Option<String>> {
        self.document
            .select(container)
            .map(|element| {
                element
                    .select(nested)
                    .next()
                    .and_then(|inner| inner.value().attr(attr))
                    .and_then(|value| resolve(value, &self.base_url))
            })
            .collect()
    }
}

impl PageReader for RenderedPage<'_> {
    fn find_item_links(&self) -> Vec<Option<String>> {
        self.nested_attr(
            &self.selectors.listing_item,
            &self.selectors.item_link,
            "href",
            resolve_href,
        )
    }

    fn find_media_sources(&self) -> Vec<Option<String>> {
        self.nested_attr(
            &self.selectors.media_container,
            &self.selectors.media_image,
            "src",
            resolve_src,
        )
    }
}
