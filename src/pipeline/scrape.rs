// src/pipeline/scrape.rs

//! Discovery followed by keyword-match enrichment.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, KeywordMatcher};
use crate::pipeline::RunStats;
use crate::pipeline::persist::RawResults;
use crate::renderer::Renderer;
use crate::services::{DiscoveryOutcome, EnrichMode, ListingEnricher, UrlDiscovery};
use crate::storage::{LocalCache, ResultStore};
use crate::utils::console;

/// Discover listing URLs for every configured partition.
///
/// Cached partitions are reused; fetched ones are cached for later runs.
pub async fn run_discovery(
    config: &Arc<Config>,
    renderer: Arc<dyn Renderer>,
) -> Result<DiscoveryOutcome> {
    let cache = Arc::new(LocalCache::new(&config.cache_folder));
    let discovery = UrlDiscovery::new(Arc::clone(config), renderer, cache)?;
    Ok(discovery.discover().await)
}

/// Run the scraper: discover URLs and keep listings matching a filter keyword.
pub async fn run_scrape(config: &Config, renderer: Arc<dyn Renderer>) -> Result<RunStats> {
    console::header("Scraper starting");
    let config = Arc::new(config.clone());
    let mut stats = RunStats::start();

    let discovered = run_discovery(&config, Arc::clone(&renderer)).await?;
    stats.record_discovery(&discovered);

    let store = ResultStore::from_config(&config);
    let existing = store.load_existing_links().await;
    let mut results = RawResults::open(&store).await?;

    let enricher = ListingEnricher::new(
        Arc::clone(&config),
        renderer,
        EnrichMode::KeywordMatch(KeywordMatcher::from_config(&config)),
    );
    let enriched = enricher
        .enrich(discovered.urls, &existing, config.concurrency())
        .await;
    stats.record_enrichment(&enriched);

    results.extend(enriched.records);
    stats.saved_total = results.save().await?;

    let stats = stats.finish();
    stats.log_summary("Scrape");
    Ok(stats)
}
