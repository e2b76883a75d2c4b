// src/renderer/http.rs

//! Static HTML renderer backed by `reqwest` and `scraper`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::renderer::{ClickOutcome, Document, Page, Renderer};
use crate::utils::http;

/// Renderer that fetches pages over plain HTTP.
///
/// Without script execution a selector either matches the fetched document or
/// never will, so waits resolve immediately.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Build a renderer using a randomly chosen configured user agent.
    pub fn new(config: &Config) -> Result<Self> {
        let user_agent = http::pick_user_agent(&config.user_agents)?;
        if !config.headless {
            log::debug!("headless=false has no effect on the HTTP renderer");
        }
        log::info!("Renderer user agent: {}", user_agent);

        let client = http::create_async_client(user_agent)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            document: Document::default(),
        }))
    }
}

/// A page holding the HTML of its last navigation.
pub struct HttpPage {
    client: Client,
    document: Document,
}

#[async_trait]
impl Page for HttpPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let request = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let final_url = response.url().clone();
            let body = response.text().await?;
            Ok::<_, AppError>((final_url, body))
        };

        let (final_url, body) = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| {
                AppError::timeout(format!("navigate {url}"), timeout.as_millis() as u64)
            })??;

        self.document.load(final_url, body);
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
        self.document.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page_with(html: &str) -> HttpPage {
        let mut document = Document::default();
        document.load(Url::parse("https://www.example.de/").unwrap(), html.to_string());
        HttpPage {
            client: Client::new(),
            document,
        }
    }

    #[tokio::test]
    async fn wait_and_click_follow_document_contents() {
        let mut page = page_with(r#"<h1 id="viewad-title">T</h1><h2 id="viewad-price">1 €</h2>"#);
        let budget = Duration::from_millis(10);

        assert!(page.wait_for_selector("h1#viewad-title", budget).await.is_ok());
        assert!(matches!(
            page.wait_for_selector("a.j-overlay-close", budget).await,
            Err(AppError::Timeout { .. })
        ));
        assert_eq!(page.click("h2#viewad-price", budget).await, ClickOutcome::Clicked);
        assert_eq!(page.click("button.missing", budget).await, ClickOutcome::TimedOut);
    }

    #[tokio::test]
    async fn close_drops_document() {
        let mut page = page_with("<h1>T</h1>");
        assert_eq!(page.extract_text("h1").await.unwrap().as_deref(), Some("T"));
        page.close().await;
        assert!(page.extract_text("h1").await.is_err());
    }

    #[tokio::test]
    async fn navigation_to_unreachable_host_fails() {
        let mut page = page_with("");
        let result = page
            .navigate("http://127.0.0.1:9/unreachable", Duration::from_secs(2))
            .await;
        assert!(result.is_err());
    }
}
