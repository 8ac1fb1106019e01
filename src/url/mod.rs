//! URL handling module for Gallery-Harvest
//!
//! This module builds paginated listing URLs, resolves hrefs found in
//! rendered pages, and derives item identifiers from detail-page paths.

mod identity;
mod listing;
mod resolve;

// Re-export main functions
pub use identity::item_identity;
pub use listing::listing_page_url;
pub use resolve::{resolve_href, resolve_src};
