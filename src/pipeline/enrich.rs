// src/pipeline/enrich.rs

//! Enrichment of every cached URL batch.
//!
//! Each cache file is one batch. Accumulated results are flushed every
//! `save_interval` batches and once more at the end, so a crash loses at most
//! the batches since the last flush.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, DiscoveryPartition};
use crate::pipeline::RunStats;
use crate::pipeline::persist::{FlushPolicy, RawResults};
use crate::renderer::Renderer;
use crate::services::{EnrichMode, ListingEnricher};
use crate::storage::{LocalCache, ResultStore};
use crate::utils::console;

/// Run the enricher over all cached URL lists.
pub async fn run_enrich(config: &Config, renderer: Arc<dyn Renderer>) -> Result<RunStats> {
    console::header("Enrichment starting");
    let config = Arc::new(config.clone());
    let mut stats = RunStats::start();

    let cache = LocalCache::new(&config.cache_folder);
    let batches = cache.entries().await?;
    log::info!(
        "Found {} cache files in {}",
        batches.len(),
        cache.root_dir().display()
    );

    let store = ResultStore::from_config(&config);
    let mut existing = store.load_existing_links().await;
    let mut results = RawResults::open(&store).await?;
    let mut flush = FlushPolicy::every(config.save_interval);

    let enricher = ListingEnricher::new(Arc::clone(&config), renderer, EnrichMode::Exclusion);

    for path in &batches {
        let urls = match LocalCache::read_entry(path).await {
            Ok(Some(urls)) => urls,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Skipping cache file: {}", e);
                continue;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match DiscoveryPartition::from_file_name(&name) {
            Some(p) => log::info!(
                "Processing price {} / page {} with {} URLs",
                p.price,
                p.page,
                urls.len()
            ),
            None => log::info!("Processing {} with {} URLs", name, urls.len()),
        }

        let outcome = enricher
            .enrich(urls, &existing, config.concurrency())
            .await;
        stats.record_enrichment(&outcome);
        stats.cache_batches += 1;

        existing.extend(outcome.records.iter().map(|r| r.url.clone()));
        results.extend(outcome.records);

        if flush.batch_done() {
            log::info!("Intermediate save after {} cache files", flush.processed());
            if let Err(e) = results.save().await {
                log::error!("Intermediate save failed: {}", e);
            }
        }
    }

    stats.saved_total = results.save().await?;

    let stats = stats.finish();
    stats.log_summary("Enrichment");
    Ok(stats)
}
