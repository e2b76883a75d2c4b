//! Shared fixtures for the pipeline integration tests.

#![allow(dead_code)]

use std::path::Path;

use classifieds_crawler::models::Config;
use classifieds_crawler::renderer::StaticRenderer;

pub const BASE: &str = "https://markt.test";

/// Flat-mode config with every store inside `root`.
pub fn config(root: &Path) -> Config {
    let mut config = Config::from_toml_str(
        r#"
        search_query = "thinkpad"
        category_code = "k0"
        price_min = 0
        price_max = 0
        use_price_stepping = false
        pages = 1
        output_json = "output/results.json"
        output_cleaned_json = "output/results_cleaned.json"
        cache_folder = "cache"
        filter_keywords = []
        exclude_titles = []
        user_agents = ["Mozilla/5.0 (test)"]
        base_url = "https://markt.test"

        [timeouts]
        overlay_ms = 1
        "#,
    )
    .unwrap();
    config.output_json = root.join("output/results.json");
    config.output_cleaned_json = root.join("output/results_cleaned.json");
    config.cache_folder = root.join("cache");
    config.backup_folder = root.join("backup");
    config.validate().unwrap();
    config
}

pub fn search_url(page: u32) -> String {
    format!("{BASE}/s-thinkpad/sortierung:preis/preis:0:/seite:{page}/k0")
}

pub fn listing_url(id: usize) -> String {
    format!("{BASE}/s-anzeige/thinkpad-{id}/{id}")
}

/// Search result page linking to `ids`.
pub fn results_page(ids: &[usize]) -> String {
    let anchors: String = ids
        .iter()
        .map(|id| format!(r#"<a class="ellipsis" href="/s-anzeige/thinkpad-{id}/{id}">T{id}</a>"#))
        .collect();
    format!(
        r#"<html><body>
        <button data-testid="gdpr-banner-decline-button">Ablehnen</button>
        {anchors}
        <a class="ellipsis" href="/pro/haendler">Händler</a>
        </body></html>"#
    )
}

pub fn listing_page(title: &str, description: &str) -> String {
    format!(
        r#"<html><body>
        <h1 id="viewad-title">{title}</h1>
        <h2 id="viewad-price">199 € VB</h2>
        <span class="boxedarticle--details--shipping">Versand möglich</span>
        <span id="viewad-locality">10115 Berlin</span>
        <div><i class="icon-calendar-gray-simple"></i><span>01.10.2026</span></div>
        <p id="viewad-description-text">{description}</p>
        </body></html>"#
    )
}

/// Renderer serving one search page and a listing page per entry.
pub fn marketplace(listings: &[(usize, &str, &str)]) -> StaticRenderer {
    let ids: Vec<usize> = listings.iter().map(|(id, _, _)| *id).collect();
    listings.iter().fold(
        StaticRenderer::new().with_page(search_url(1), results_page(&ids)),
        |renderer, (id, title, description)| {
            renderer.with_page(listing_url(*id), listing_page(title, description))
        },
    )
}
