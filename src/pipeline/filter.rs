// src/pipeline/filter.rs

//! Classification of raw results into the cleaned store.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{Config, EnrichedRecord, ExclusionRules};
use crate::storage::ResultStore;
use crate::utils::console;

/// Records of one filter pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Records to append to the cleaned store, in raw order
    pub accepted: Vec<EnrichedRecord>,
    /// URLs dropped by a ban phrase or a negative phrase
    pub excluded: Vec<String>,
    /// Records already present in the cleaned store
    pub already_cleaned: usize,
}

/// Split raw records into newly accepted and excluded.
///
/// `cleaned_urls` is updated with every accepted URL, so a URL occurring
/// twice in `raw` is accepted at most once.
pub fn classify(
    raw: Vec<EnrichedRecord>,
    cleaned_urls: &mut HashSet<String>,
    rules: &ExclusionRules,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for record in raw {
        if cleaned_urls.contains(&record.url) {
            outcome.already_cleaned += 1;
            continue;
        }
        if rules.title_banned(&record.title) || rules.description_rejected(&record.description) {
            outcome.excluded.push(record.url);
            continue;
        }
        cleaned_urls.insert(record.url.clone());
        outcome.accepted.push(record);
    }

    outcome
}

/// Result of [`run_filter`].
#[derive(Debug)]
pub struct FilterSummary {
    pub raw_total: usize,
    pub accepted: usize,
    pub excluded: usize,
    pub cleaned_total: usize,
    pub excluded_file: Option<PathBuf>,
}

/// Append newly accepted raw records to the cleaned store.
pub async fn run_filter(config: &Config) -> Result<FilterSummary> {
    console::header("Filter starting");
    let store = ResultStore::from_config(config);
    let rules = ExclusionRules::from_config(config);
    if rules.is_empty() {
        log::info!("No exclusion rules configured; accepting every new record");
    }

    if !tokio::fs::try_exists(store.raw_path()).await? {
        log::warn!(
            "Raw store {} not found; nothing to filter",
            store.raw_path().display()
        );
    }
    let raw = store.load_raw().await;
    let raw_total = raw.len();

    let mut cleaned = store.load_cleaned_for_append().await?;
    let mut cleaned_urls: HashSet<String> = cleaned.iter().map(|r| r.url.clone()).collect();

    let outcome = classify(raw, &mut cleaned_urls, &rules);
    let accepted = outcome.accepted.len();
    cleaned.extend(outcome.accepted);
    store.save_cleaned(&cleaned).await?;

    let excluded_file = store.save_excluded(&outcome.excluded).await?;
    if let Some(path) = &excluded_file {
        log::warn!("{} excluded links saved", outcome.excluded.len());
        console::sub_item(&format!("Audit file: {}", path.display()));
    }

    let summary = FilterSummary {
        raw_total,
        accepted,
        excluded: outcome.excluded.len(),
        cleaned_total: cleaned.len(),
        excluded_file,
    };
    console::summary(
        "Filter",
        &[
            ("New / raw", console::ratio(summary.accepted, summary.raw_total)),
            ("Already cleaned", outcome.already_cleaned.to_string()),
            ("Excluded", summary.excluded.to_string()),
            ("Cleaned total", summary.cleaned_total.to_string()),
        ],
    );
    Ok(summary)
}
