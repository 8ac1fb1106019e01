//! Media reference extraction from rendered detail pages

use crate::browser::PageReader;
use crate::harvest::MediaReference;

/// Turns a rendered detail page into an ordered list of media references
///
/// Pure function of the DOM snapshot: no network access, no mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MediaExtractor;

impl MediaExtractor {
    /// Returns one reference per media container, in document order
    ///
    /// A container whose image has no source still yields a reference, with
    /// an empty `source_url`, so ordinals keep matching container positions.
    pub fn extract<R: PageReader + ?Sized>(&self, page: &R) -> Vec<MediaReference> {
        page.find_media_sources()
            .into_iter()
            .enumerate()
            .map(|(ordinal_index, source)| MediaReference {
                source_url: source.unwrap_or_default(),
                ordinal_index,
            })
            .collect()
    }
}
