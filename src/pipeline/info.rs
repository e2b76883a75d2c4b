// src/pipeline/info.rs

//! Effective configuration and store status.

use crate::error::Result;
use crate::models::{Config, TraversalMode};
use crate::storage::{LocalCache, ResultStore};
use crate::utils::console;

/// Presence and size of the persisted stores.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub partitions_planned: usize,
    pub cache_files: usize,
    /// `None` when the file does not exist or cannot be parsed
    pub raw_records: Option<usize>,
    pub cleaned_records: Option<usize>,
}

/// Inspect the cache and result stores without modifying them.
pub async fn store_status(config: &Config) -> Result<StoreStatus> {
    let cache = LocalCache::new(&config.cache_folder);
    let store = ResultStore::from_config(config);

    let count = |records: Result<Option<Vec<_>>>| records.ok().flatten().map(|r| r.len());
    Ok(StoreStatus {
        partitions_planned: TraversalMode::from_config(config).partitions().len(),
        cache_files: cache.entries().await?.len(),
        raw_records: count(ResultStore::read_records(store.raw_path()).await),
        cleaned_records: count(ResultStore::read_records(store.cleaned_path()).await),
    })
}

/// Log the effective configuration and store status.
pub async fn run_info(config: &Config) -> Result<StoreStatus> {
    let status = store_status(config).await?;
    let describe = |n: Option<usize>| {
        n.map_or_else(
            || "missing or unreadable".to_string(),
            |n| format!("{n} records"),
        )
    };

    console::summary(
        "Configuration",
        &[
            ("Search", format!("{} ({})", config.search_query, config.category_code)),
            ("Price range", format!("{}..={}", config.price_min, config.price_max)),
            ("Price stepping", config.use_price_stepping.to_string()),
            ("Partitions", status.partitions_planned.to_string()),
            ("Concurrency", config.concurrency().to_string()),
            ("Filter keywords", config.filter_keywords.join(", ")),
            ("Negative keywords", config.negative_keywords.join(", ")),
            ("Excluded titles", config.exclude_titles.join(", ")),
        ],
    );
    console::summary(
        "Stores",
        &[
            (
                "Cache",
                format!("{} files in {}", status.cache_files, config.cache_folder.display()),
            ),
            (
                "Raw",
                format!("{} ({})", config.output_json.display(), describe(status.raw_records)),
            ),
            (
                "Cleaned",
                format!(
                    "{} ({})",
                    config.output_cleaned_json.display(),
                    describe(status.cleaned_records)
                ),
            ),
        ],
    );
    Ok(status)
}
