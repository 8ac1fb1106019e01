//! reqwest-backed browsing engine
//!
//! Each context holds the last fetched document for its URL. Render
//! completion is detected by polling: the document is re-fetched until the
//! awaited selector matches or the wait times out. The first re-fetch comes
//! `poll_interval` after the initial load and the gap doubles after each one,
//! so a page that never matches costs a handful of requests per wait.

use super::{count_matches, Browser, BrowserError, BrowsingContext};
use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Open contexts allowed at once: one listing context plus one detail context
pub const MAX_CONTEXTS: usize = 2;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `request_timeout` - Upper bound for a single request, body included
///
/// # Example
///
/// ```no_run
/// use gallery_harvest::browser::build_http_client;
/// use gallery_harvest::config::UserAgentConfig;
/// use std::time::Duration;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Browsing engine that fetches documents over HTTP
pub struct HttpBrowser {
    client: Client,
    poll_interval: Duration,
    open_contexts: Arc<AtomicUsize>,
}

impl HttpBrowser {
    pub fn new(client: Client, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            open_contexts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of contexts currently open
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    type Context = HttpContext;

    async fn new_context(&self) -> Result<HttpContext, BrowserError> {
        let previously_open = self.open_contexts.fetch_add(1, Ordering::SeqCst);
        if previously_open >= MAX_CONTEXTS {
            self.open_contexts.fetch_sub(1, Ordering::SeqCst);
            return Err(BrowserError::ContextLimit {
                limit: MAX_CONTEXTS,
            });
        }

        tracing::trace!("Opened browsing context ({} open)", previously_open + 1);
        Ok(HttpContext::new(self.client.clone(), self.poll_interval))
    }

    async fn close_context(&self, context: HttpContext) -> Result<(), BrowserError> {
        drop(context);
        let previously_open = self.open_contexts.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!("Closed browsing context ({} open)", previously_open - 1);
        Ok(())
    }

    async fn shutdown(self) -> Result<(), BrowserError> {
        let leaked = self.open_contexts();
        if leaked > 0 {
            tracing::warn!("Shutting down browser with {} context(s) still open", leaked);
        }
        tracing::debug!("Browser session released");
        Ok(())
    }
}

/// A context of [`HttpBrowser`]
pub struct HttpContext {
    client: Client,
    poll_interval: Duration,
    current_url: Option<Url>,
    document: Option<String>,
}

impl HttpContext {
    fn new(client: Client, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            current_url: None,
            document: None,
        }
    }

    async fn fetch(&self, url: &Url) -> Result<(Url, String), BrowserError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| BrowserError::Navigation {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|source| BrowserError::Navigation {
                url: url.to_string(),
                source,
            })?;

        Ok((final_url, body))
    }
}

#[async_trait]
impl BrowsingContext for HttpContext {
    async fn navigate(&mut self, url: &Url) -> Result<(), BrowserError> {
        self.current_url = None;
        self.document = None;

        let (final_url, body) = self.fetch(url).await?;
        self.current_url = Some(final_url);
        self.document = Some(body);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let deadline = Instant::now() + timeout;
        let mut refetch_interval = self.poll_interval;

        loop {
            let document = self.document.as_deref().ok_or(BrowserError::NoDocument)?;
            if count_matches(document, selector)? > 0 {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(refetch_interval.min(deadline - now)).await;
            refetch_interval = refetch_interval.saturating_mul(2);

            let url = self.current_url.clone().ok_or(BrowserError::NoDocument)?;
            let (_, body) = self.fetch(&url).await?;
            self.document = Some(body);
        }
    }

    async fn rendered_html(&self) -> Result<String, BrowserError> {
        self.document.clone().ok_or(BrowserError::NoDocument)
    }

    fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }
}
