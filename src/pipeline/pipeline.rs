// src/pipeline/pipeline.rs

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::renderer::Renderer;
use crate::utils::console;

use super::enrich::run_enrich;
use super::filter::{FilterSummary, run_filter};
use super::scrape::run_discovery;
use super::stats::RunStats;

/// Run discovery, enrichment and filtering in sequence.
///
/// Discovery fills the URL cache; enrichment then walks every cache file.
pub async fn run_pipeline(
    config: &Config,
    renderer: Arc<dyn Renderer>,
) -> Result<(RunStats, FilterSummary)> {
    console::header("Pipeline starting");
    let shared = Arc::new(config.clone());

    console::step(1, 3, "Discover - Collecting listing URLs");
    let discovered = run_discovery(&shared, Arc::clone(&renderer)).await?;

    console::step(2, 3, "Enrich - Fetching listing details");
    let mut stats = run_enrich(config, renderer).await?;
    stats.record_discovery(&discovered);

    console::step(3, 3, "Filter - Updating cleaned results");
    let filtered = run_filter(config).await?;

    log::info!("Pipeline complete");
    Ok((stats, filtered))
}
