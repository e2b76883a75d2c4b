//! Page renderer capability.
//!
//! The pipeline only talks to a [`Renderer`] that spawns independent
//! [`Page`] contexts. A page is exclusively owned by one task and must be
//! closed by that task on every exit path.
//!
//! - `HttpRenderer`: fetches static HTML with `reqwest` and answers selector
//!   queries with `scraper` (no script execution)
//! - `StaticRenderer`: serves fixed HTML from memory and records navigations

mod document;
mod fixture;
mod http;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use document::Document;
pub use fixture::{RenderStats, StaticPage, StaticRenderer};
pub use http::{HttpPage, HttpRenderer};

/// Result of a best-effort click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Clicked,
    TimedOut,
}

impl ClickOutcome {
    pub fn is_clicked(self) -> bool {
        self == Self::Clicked
    }
}

/// Shared browser-level context. Only used to open new pages.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a fresh page context.
    async fn new_page(&self) -> Result<Box<dyn Page>>;
}

/// A single navigable document.
#[async_trait]
pub trait Page: Send + Sync {
    /// Load `url`, failing with a timeout error after `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until `selector` matches, failing with a timeout error after `timeout`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Text of the first element matching `selector`, `None` when absent.
    async fn extract_text(&self, selector: &str) -> Result<Option<String>>;

    /// Text of the first element matching `selector` with line breaks kept.
    async fn extract_multiline_text(&self, selector: &str) -> Result<Option<String>>;

    /// `attribute` of every element matching `selector`.
    async fn extract_attributes_from_all(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str, timeout: Duration) -> ClickOutcome;

    /// Release the page context.
    async fn close(&mut self);
}
