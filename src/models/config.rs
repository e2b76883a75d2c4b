//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::DiscoveryPartition;

/// Root application configuration.
///
/// Loaded once at process start and passed by reference into every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search term inserted into the search URL path
    pub search_query: String,

    /// Marketplace category code appended to the search URL
    pub category_code: String,

    /// Lower bound of the price range (also the flat-mode price)
    pub price_min: u32,

    /// Upper bound of the price range (inclusive)
    pub price_max: u32,

    /// Iterate price buckets instead of plain pages
    pub use_price_stepping: bool,

    /// Number of result pages in flat mode
    pub pages: u32,

    /// Number of result pages per price bucket in stepped mode
    #[serde(default = "defaults::pages_per_price_step")]
    pub pages_per_price_step: u32,

    /// Raw result file
    pub output_json: PathBuf,

    /// Cleaned result file
    pub output_cleaned_json: PathBuf,

    /// Directory holding one cached URL list per discovery partition
    pub cache_folder: PathBuf,

    /// Run the renderer without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Description keywords required in keyword-match mode
    pub filter_keywords: Vec<String>,

    /// Description phrases that exclude a listing
    #[serde(default)]
    pub negative_keywords: Vec<String>,

    /// Title phrases that exclude a listing unconditionally
    pub exclude_titles: Vec<String>,

    /// User agents to choose from per run
    pub user_agents: Vec<String>,

    /// Allow more than one listing fetch in flight
    #[serde(default)]
    pub enable_parallel: bool,

    /// Listing fetches in flight when parallel mode is enabled
    #[serde(default = "defaults::parallel_tabs")]
    pub parallel_tabs: usize,

    /// Marketplace origin used to build search URLs
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Directory for result backups and exclusion audit files
    #[serde(default = "defaults::backup_folder")]
    pub backup_folder: PathBuf,

    /// Persist accumulated results after this many cache batches
    #[serde(default = "defaults::save_interval")]
    pub save_interval: usize,

    /// Renderer time budgets
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Marketplace markup selectors
    #[serde(default)]
    pub selectors: SiteSelectors,
}

impl Config {
    /// Load and validate configuration from a `.json` or `.toml` file.
    ///
    /// Any failure is a [`AppError::Config`]; there is no fallback.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed: std::result::Result<Self, String> = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };
        let config = parsed.map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AppError::config(e.to_string()))
    }

    /// Parse configuration from JSON text without validating it.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| AppError::config(e.to_string()))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.search_query.trim().is_empty() {
            return Err(AppError::config("search_query is empty"));
        }
        if self.price_min > self.price_max {
            return Err(AppError::config(format!(
                "price_min ({}) exceeds price_max ({})",
                self.price_min, self.price_max
            )));
        }
        if self.use_price_stepping && self.pages_per_price_step == 0 {
            return Err(AppError::config("pages_per_price_step must be > 0"));
        }
        if !self.use_price_stepping && self.pages == 0 {
            return Err(AppError::config("pages must be > 0"));
        }
        if self.parallel_tabs == 0 {
            return Err(AppError::config("parallel_tabs must be > 0"));
        }
        if self.save_interval == 0 {
            return Err(AppError::config("save_interval must be > 0"));
        }
        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(AppError::config("user_agents has no usable entry"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| AppError::config(format!("base_url '{}': {e}", self.base_url)))?;
        self.selectors.validate()
    }

    /// Number of listing fetches allowed in flight.
    pub fn concurrency(&self) -> usize {
        if self.enable_parallel {
            self.parallel_tabs.max(1)
        } else {
            1
        }
    }

    /// Deterministic search URL for one discovery partition.
    pub fn search_url(&self, partition: &DiscoveryPartition) -> String {
        format!(
            "{}/s-{}/sortierung:preis/preis:{}:/seite:{}/{}",
            self.base_url.trim_end_matches('/'),
            self.search_query,
            partition.price,
            partition.page,
            self.category_code
        )
    }
}

/// Renderer time budgets in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Navigation to a search result page
    #[serde(default = "defaults::discovery_navigation_ms")]
    pub discovery_navigation_ms: u64,

    /// Wait for the result anchors on a search result page
    #[serde(default = "defaults::results_wait_ms")]
    pub results_wait_ms: u64,

    /// Navigation to a listing detail page
    #[serde(default = "defaults::listing_navigation_ms")]
    pub listing_navigation_ms: u64,

    /// Wait for the listing title element
    #[serde(default = "defaults::title_wait_ms")]
    pub title_wait_ms: u64,

    /// Cookie banner and login overlay interactions
    #[serde(default = "defaults::overlay_ms")]
    pub overlay_ms: u64,
}

impl TimeoutConfig {
    pub fn discovery_navigation(&self) -> Duration {
        Duration::from_millis(self.discovery_navigation_ms)
    }

    pub fn results_wait(&self) -> Duration {
        Duration::from_millis(self.results_wait_ms)
    }

    pub fn listing_navigation(&self) -> Duration {
        Duration::from_millis(self.listing_navigation_ms)
    }

    pub fn title_wait(&self) -> Duration {
        Duration::from_millis(self.title_wait_ms)
    }

    pub fn overlay(&self) -> Duration {
        Duration::from_millis(self.overlay_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            discovery_navigation_ms: defaults::discovery_navigation_ms(),
            results_wait_ms: defaults::results_wait_ms(),
            listing_navigation_ms: defaults::listing_navigation_ms(),
            title_wait_ms: defaults::title_wait_ms(),
            overlay_ms: defaults::overlay_ms(),
        }
    }
}

/// CSS selectors and patterns describing the marketplace markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSelectors {
    /// Result link anchors on a search page
    #[serde(default = "defaults::results_anchor")]
    pub results_anchor: String,

    /// Regex a result href must match to count as a listing URL
    #[serde(default = "defaults::listing_url_pattern")]
    pub listing_url_pattern: String,

    #[serde(default = "defaults::title")]
    pub title: String,

    #[serde(default = "defaults::price")]
    pub price: String,

    #[serde(default = "defaults::shipping")]
    pub shipping: String,

    #[serde(default = "defaults::location")]
    pub location: String,

    #[serde(default = "defaults::date")]
    pub date: String,

    #[serde(default = "defaults::description")]
    pub description: String,

    /// Cookie banner decline button (tried first)
    #[serde(default = "defaults::cookie_decline")]
    pub cookie_decline: String,

    /// Cookie banner accept button (fallback)
    #[serde(default = "defaults::cookie_accept")]
    pub cookie_accept: String,

    /// Close button of the login overlay
    #[serde(default = "defaults::login_overlay_close")]
    pub login_overlay_close: String,
}

impl SiteSelectors {
    /// Check that every selector parses and the listing pattern compiles.
    pub fn validate(&self) -> Result<()> {
        for selector in [
            &self.results_anchor,
            &self.title,
            &self.price,
            &self.shipping,
            &self.location,
            &self.date,
            &self.description,
            &self.cookie_decline,
            &self.cookie_accept,
            &self.login_overlay_close,
        ] {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Regex::new(&self.listing_url_pattern)?;
        Ok(())
    }

    /// Compiled listing URL pattern.
    pub fn listing_url_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.listing_url_pattern)?)
    }
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            results_anchor: defaults::results_anchor(),
            listing_url_pattern: defaults::listing_url_pattern(),
            title: defaults::title(),
            price: defaults::price(),
            shipping: defaults::shipping(),
            location: defaults::location(),
            date: defaults::date(),
            description: defaults::description(),
            cookie_decline: defaults::cookie_decline(),
            cookie_accept: defaults::cookie_accept(),
            login_overlay_close: defaults::login_overlay_close(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn pages_per_price_step() -> u32 {
        2
    }
    pub fn headless() -> bool {
        true
    }
    pub fn parallel_tabs() -> usize {
        4
    }
    pub fn base_url() -> String {
        "https://www.kleinanzeigen.de".into()
    }
    pub fn backup_folder() -> PathBuf {
        PathBuf::from("backup")
    }
    pub fn save_interval() -> usize {
        10
    }

    // Timeouts
    pub fn discovery_navigation_ms() -> u64 {
        60_000
    }
    pub fn results_wait_ms() -> u64 {
        10_000
    }
    pub fn listing_navigation_ms() -> u64 {
        30_000
    }
    pub fn title_wait_ms() -> u64 {
        8_000
    }
    pub fn overlay_ms() -> u64 {
        3_000
    }

    // Selectors
    pub fn results_anchor() -> String {
        "a.ellipsis".into()
    }
    pub fn listing_url_pattern() -> String {
        "/s-anzeige/".into()
    }
    pub fn title() -> String {
        "h1#viewad-title".into()
    }
    pub fn price() -> String {
        "h2#viewad-price".into()
    }
    pub fn shipping() -> String {
        "span.boxedarticle--details--shipping".into()
    }
    pub fn location() -> String {
        "span#viewad-locality".into()
    }
    pub fn date() -> String {
        "div > i.icon-calendar-gray-simple + span".into()
    }
    pub fn description() -> String {
        "p#viewad-description-text".into()
    }
    pub fn cookie_decline() -> String {
        "button[data-testid='gdpr-banner-decline-button']".into()
    }
    pub fn cookie_accept() -> String {
        "button[data-testid='uc-accept-all-button']".into()
    }
    pub fn login_overlay_close() -> String {
        "a.j-overlay-close".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
        search_query = "thinkpad"
        category_code = "k0"
        price_min = 50
        price_max = 52
        use_price_stepping = false
        pages = 3
        output_json = "output/results.json"
        output_cleaned_json = "output/results_cleaned.json"
        cache_folder = "cache"
        filter_keywords = ["i7"]
        exclude_titles = ["defekt"]
        user_agents = ["Mozilla/5.0"]
    "#;

    fn minimal() -> Config {
        Config::from_toml_str(MINIMAL_TOML).unwrap()
    }

    #[test]
    fn minimal_toml_applies_defaults() {
        let config = minimal();
        assert_eq!(config.pages_per_price_step, 2);
        assert_eq!(config.parallel_tabs, 4);
        assert_eq!(config.save_interval, 10);
        assert!(config.headless);
        assert!(config.negative_keywords.is_empty());
        assert_eq!(config.timeouts.results_wait_ms, 10_000);
        assert_eq!(config.selectors.title, "h1#viewad-title");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn legacy_json_settings_parse() {
        let json = r#"{
            "search_query": "thinkpad",
            "category_code": "k0",
            "price_min": 10,
            "price_max": 20,
            "use_price_stepping": true,
            "pages": 1,
            "pages_per_price_step": 3,
            "output_json": "output/results.json",
            "output_cleaned_json": "output/results_cleaned.json",
            "cache_folder": "cache",
            "headless": false,
            "filter_keywords": ["i5"],
            "negative_keywords": ["bastler"],
            "exclude_titles": ["suche"],
            "user_agents": ["UA"],
            "enable_parallel": true,
            "parallel_tabs": 6
        }"#;
        let config = Config::from_json_str(json).unwrap();
        assert!(config.use_price_stepping);
        assert_eq!(config.pages_per_price_step, 3);
        assert_eq!(config.concurrency(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_required_key_is_config_error() {
        let without_query = MINIMAL_TOML.replace("search_query = \"thinkpad\"", "");
        let err = Config::from_toml_str(&without_query).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("search_query"));
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let err = Config::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn concurrency_is_one_unless_parallel() {
        let mut config = minimal();
        config.parallel_tabs = 8;
        assert_eq!(config.concurrency(), 1);
        config.enable_parallel = true;
        assert_eq!(config.concurrency(), 8);
    }

    #[test]
    fn validate_rejects_inverted_price_range() {
        let mut config = minimal();
        config.price_min = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_pages_in_flat_mode() {
        let mut config = minimal();
        config.pages = 0;
        assert!(config.validate().is_err());
        config.use_price_stepping = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = minimal();
        config.selectors.title = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn search_url_is_deterministic() {
        let config = minimal();
        let partition = DiscoveryPartition::new(75, 2);
        assert_eq!(
            config.search_url(&partition),
            "https://www.kleinanzeigen.de/s-thinkpad/sortierung:preis/preis:75:/seite:2/k0"
        );
        assert_eq!(config.search_url(&partition), config.search_url(&partition));
    }
}
