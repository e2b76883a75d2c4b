//! Best-effort dismissal of the cookie banner and the login overlay.
//!
//! Nothing here fails: a banner that never shows up is treated as already
//! handled.

use std::time::Duration;

use crate::models::SiteSelectors;
use crate::renderer::Page;

/// What the dismissal pass managed to click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dismissal {
    pub cookie_banner: bool,
    pub login_overlay: bool,
}

/// Handle the cookie banner, then the login overlay.
pub async fn dismiss_overlays(
    page: &mut dyn Page,
    selectors: &SiteSelectors,
    timeout: Duration,
) -> Dismissal {
    Dismissal {
        cookie_banner: handle_cookie_banner(page, selectors, timeout).await,
        login_overlay: close_login_overlay(page, selectors, timeout).await,
    }
}

/// Decline the consent banner, or accept it if declining is not offered.
async fn handle_cookie_banner(
    page: &mut dyn Page,
    selectors: &SiteSelectors,
    timeout: Duration,
) -> bool {
    for selector in [&selectors.cookie_decline, &selectors.cookie_accept] {
        if page.click(selector, timeout).await.is_clicked() {
            log::debug!("Cookie banner handled via {}", selector);
            return true;
        }
    }
    false
}

async fn close_login_overlay(
    page: &mut dyn Page,
    selectors: &SiteSelectors,
    timeout: Duration,
) -> bool {
    let selector = &selectors.login_overlay_close;
    if page.wait_for_selector(selector, timeout).await.is_err() {
        return false;
    }
    let clicked = page.click(selector, timeout).await.is_clicked();
    if clicked {
        log::debug!("Dismissed login overlay");
    }
    clicked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Renderer, StaticRenderer};

    const URL: &str = "https://x.test/listing";

    async fn dismiss(html: &str) -> Dismissal {
        let renderer = StaticRenderer::new().with_page(URL, html);
        let mut page = renderer.new_page().await.unwrap();
        page.navigate(URL, Duration::from_secs(1)).await.unwrap();
        let outcome =
            dismiss_overlays(page.as_mut(), &SiteSelectors::default(), Duration::from_millis(5))
                .await;
        page.close().await;
        outcome
    }

    #[tokio::test]
    async fn declines_cookie_banner() {
        let outcome = dismiss(
            r#"<button data-testid="gdpr-banner-decline-button">Nein</button>"#,
        )
        .await;
        assert!(outcome.cookie_banner);
        assert!(!outcome.login_overlay);
    }

    #[tokio::test]
    async fn falls_back_to_accepting_cookies() {
        let outcome =
            dismiss(r#"<button data-testid="uc-accept-all-button">OK</button>"#).await;
        assert!(outcome.cookie_banner);
    }

    #[tokio::test]
    async fn closes_login_overlay() {
        let outcome = dismiss(r#"<a class="j-overlay-close overlay-close">x</a>"#).await;
        assert!(outcome.login_overlay);
    }

    #[tokio::test]
    async fn absent_overlays_are_not_errors() {
        assert_eq!(dismiss("<p>plain</p>").await, Dismissal::default());
    }
}
