//! Values flowing through the harvest pipeline

use crate::url::item_identity;
use crate::UrlError;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// A product entry found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub detail_url: Url,
    pub item_id: String,
    pub item_name: String,
}

impl ListingItem {
    /// Builds an item from an absolute detail-page link
    pub fn from_href(href: &str) -> Result<Self, UrlError> {
        let detail_url = Url::parse(href).map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
        let (item_id, item_name) = item_identity(&detail_url)?;
        Ok(Self {
            detail_url,
            item_id,
            item_name,
        })
    }
}

/// Items extracted from one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub page_number: u32,
    pub items: Vec<ListingItem>,
    /// Item elements dropped for lack of a usable link
    pub skipped: usize,
}

/// Result of asking the paginator for a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    Page(ListingPage),
    EndOfListing,
}

/// An image reference on a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// Absolute image URL; empty when the container had no source
    pub source_url: String,
    /// Zero-based position among the page's media containers
    pub ordinal_index: usize,
}

/// Why a download was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyUrl,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "image has no source URL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { bytes: u64 },
    Skipped(SkipReason),
    Failed(String),
}

/// What happened to one media reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub destination_path: PathBuf,
    pub outcome: DownloadOutcome,
}

impl DownloadResult {
    pub fn is_saved(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Saved { .. })
    }
}

/// Per-item counts returned by a detail-page visit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitSummary {
    pub media_count: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_from_href() {
        let item = ListingItem::from_href("https://shop.example/product/dkp-9/oak-table/").unwrap();
        assert_eq!(item.item_id, "dkp-9");
        assert_eq!(item.item_name, "oak-table");
        assert_eq!(
            item.detail_url.as_str(),
            "https://shop.example/product/dkp-9/oak-table/"
        );
    }

    #[test]
    fn test_item_from_relative_href_fails() {
        assert!(matches!(
            ListingItem::from_href("/product/dkp-9/oak-table"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_item_without_identity_fails() {
        assert!(matches!(
            ListingItem::from_href("https://shop.example/sale"),
            Err(UrlError::MissingIdentifier(_))
        ));
    }
}
