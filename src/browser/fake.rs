//! In-memory browsing engine for unit tests

use super::{count_matches, Browser, BrowserError, BrowsingContext};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Counters shared between a [`FakeBrowser`] and the test that owns it
#[derive(Debug, Default)]
pub struct FakeProbe {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn open_now(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }

    pub fn navigated(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

/// Serves canned documents keyed by absolute URL
#[derive(Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<HashMap<String, Result<String, u16>>>,
    probe: Arc<FakeProbe>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<(&str, Result<&str, u16>)>) -> Self {
        let pages = pages
            .into_iter()
            .map(|(url, page)| (url.to_string(), page.map(str::to_string)))
            .collect();
        Self {
            pages: Arc::new(pages),
            probe: Arc::new(FakeProbe::default()),
        }
    }

    pub fn probe(&self) -> Arc<FakeProbe> {
        Arc::clone(&self.probe)
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Context = FakeContext;

    async fn new_context(&self) -> Result<FakeContext, BrowserError> {
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeContext {
            pages: Arc::clone(&self.pages),
            probe: Arc::clone(&self.probe),
            current_url: None,
            document: None,
        })
    }

    async fn close_context(&self, _context: FakeContext) -> Result<(), BrowserError> {
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(self) -> Result<(), BrowserError> {
        self.probe.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeContext {
    pages: Arc<HashMap<String, Result<String, u16>>>,
    probe: Arc<FakeProbe>,
    current_url: Option<Url>,
    document: Option<String>,
}

#[async_trait]
impl BrowsingContext for FakeContext {
    async fn navigate(&mut self, url: &Url) -> Result<(), BrowserError> {
        self.probe
            .navigations
            .lock()
            .unwrap()
            .push(url.to_string());
        self.current_url = None;
        self.document = None;

        match self.pages.get(url.as_str()) {
            Some(Ok(html)) => {
                self.current_url = Some(url.clone());
                self.document = Some(html.clone());
                Ok(())
            }
            Some(Err(status)) => Err(BrowserError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(BrowserError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let document = self.document.as_deref().ok_or(BrowserError::NoDocument)?;
        Ok(count_matches(document, selector)? > 0)
    }

    async fn rendered_html(&self) -> Result<String, BrowserError> {
        self.document.clone().ok_or(BrowserError::NoDocument)
    }

    fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }
}
