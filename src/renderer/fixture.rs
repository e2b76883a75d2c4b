//! In-memory renderer serving fixed HTML per URL.
//!
//! Used to replay saved pages offline and to drive the pipeline in tests.
//! It records navigations and tracks how many pages are open at once.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{AppError, Result};
use crate::renderer::{ClickOutcome, Document, Page, Renderer};

/// Counters shared by a [`StaticRenderer`] and all of its pages.
#[derive(Debug, Default)]
pub struct RenderStats {
    navigations: Mutex<Vec<String>>,
    opened: AtomicUsize,
    open: AtomicUsize,
    peak_open: AtomicUsize,
}

impl RenderStats {
    /// Every URL navigated to, in call order.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn navigation_count(&self) -> usize {
        self.navigations.lock().map(|n| n.len()).unwrap_or(0)
    }

    /// Pages opened over the renderer's lifetime.
    pub fn pages_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Pages currently open.
    pub fn pages_open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open pages.
    pub fn peak_open(&self) -> usize {
        self.peak_open.load(Ordering::SeqCst)
    }

    fn record_navigation(&self, url: &str) {
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(url.to_string());
        }
    }

    fn page_opened(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open.fetch_max(now_open, Ordering::SeqCst);
    }

    fn page_closed(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Renderer answering from a URL → HTML map.
///
/// Unknown URLs fail navigation. An optional latency is applied to every
/// navigation and counts against the navigation timeout.
#[derive(Debug, Default)]
pub struct StaticRenderer {
    pages: HashMap<String, String>,
    latency: Duration,
    stats: Arc<RenderStats>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Delay every navigation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn stats(&self) -> Arc<RenderStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        self.stats.page_opened();
        Ok(Box::new(StaticPage {
            pages: self.pages.clone(),
            latency: self.latency,
            stats: Arc::clone(&self.stats),
            document: Document::default(),
            closed: false,
        }))
    }
}

/// Page of a [`StaticRenderer`].
pub struct StaticPage {
    pages: HashMap<String, String>,
    latency: Duration,
    stats: Arc<RenderStats>,
    document: Document,
    closed: bool,
}

#[async_trait]
impl Page for StaticPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.stats.record_navigation(url);

        if self.latency > timeout {
            tokio::time::sleep(timeout).await;
            return Err(AppError::timeout(
                format!("navigate {url}"),
                timeout.as_millis() as u64,
            ));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let html = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "404 Not Found"))?;
        self.document.load(Url::parse(url)?, html);
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        if self.document.matches(selector)? {
            Ok(())
        } else {
            Err(AppError::timeout(
                format!("wait for '{selector}'"),
                timeout.as_millis() as u64,
            ))
        }
    }

    async fn extract_text(&self, selector: &str) -> Result<Option<String>> {
        self.document.text(selector)
    }

    async fn extract_multiline_text(&self, selector: &str) -> Result<Option<String>> {
        self.document.multiline_text(selector)
    }

    async fn extract_attributes_from_all(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>> {
        self.document.attributes(selector, attribute)
    }

    async fn click(&mut self, selector: &str, _timeout: Duration) -> ClickOutcome {
        match self.document.matches(selector) {
            Ok(true) => ClickOutcome::Clicked,
            _ => ClickOutcome::TimedOut,
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.document.clear();
            self.stats.page_closed();
        }
    }
}
