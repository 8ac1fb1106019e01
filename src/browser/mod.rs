//! Rendering-engine capability used by the harvester
//!
//! The harvester never talks to a concrete engine directly. It opens owned
//! browsing contexts through [`Browser`], drives them through
//! [`BrowsingContext`], and reads the rendered DOM through the synchronous
//! [`PageReader`] snapshot. The shipped engine is [`HttpBrowser`], which
//! fetches documents with reqwest and polls for render completion.

#[cfg(test)]
pub(crate) mod fake;
mod http;
mod page;

pub use http::{build_http_client, HttpBrowser, HttpContext, MAX_CONTEXTS};
pub use page::{count_matches, PageReader, PageSelectors, RenderedPage};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a browsing engine
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Navigation to {url} failed: {source}")]
    Navigation { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Context has no document loaded")]
    NoDocument,

    #[error("Context limit of {limit} reached")]
    ContextLimit { limit: usize },
}

/// A browsing session that hands out isolated, owned contexts
///
/// Contexts are returned to the session with [`Browser::close_context`].
/// The session itself is released by [`Browser::shutdown`], which consumes it
/// so it cannot be released twice.
#[async_trait]
pub trait Browser: Send + Sync + Sized {
    type Context: BrowsingContext;

    /// Opens a new context with no document loaded
    async fn new_context(&self) -> Result<Self::Context, BrowserError>;

    /// Closes a context previously opened by this session
    async fn close_context(&self, context: Self::Context) -> Result<(), BrowserError>;

    /// Releases the session
    async fn shutdown(self) -> Result<(), BrowserError>;
}

/// A single page-holding context (a "tab")
#[async_trait]
pub trait BrowsingContext: Send {
    /// Loads `url` into this context
    async fn navigate(&mut self, url: &Url) -> Result<(), BrowserError>;

    /// Waits until at least one element matches `selector`
    ///
    /// Returns `Ok(false)` when `timeout` elapses without a match. That is
    /// a normal outcome, not an error.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, BrowserError>;

    /// Returns the currently rendered HTML
    async fn rendered_html(&self) -> Result<String, BrowserError>;

    /// URL of the loaded document, after redirects
    fn current_url(&self) -> Option<&Url>;
}
