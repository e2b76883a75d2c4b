// src/services/listings.rs

//! Listing detail enrichment.
//!
//! Fetches each listing's detail page in its own page context and applies the
//! exclusion rules. At most `limit` fetch tasks are in flight; every task runs
//! to completion inside the buffered stream, so the limit covers the whole
//! task and not just its network call.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};
use crate::models::{Config, EnrichedRecord, ExclusionRules, KeywordMatcher, NOT_AVAILABLE};
use crate::renderer::{Page, Renderer};
use crate::services::overlays::dismiss_overlays;

/// Description length kept in keyword-match mode, in characters.
pub const SNIPPET_CHARS: usize = 300;

/// How surviving listings are recorded.
#[derive(Debug, Clone)]
pub enum EnrichMode {
    /// Ban and negative-phrase filtering only; the full description is kept.
    Exclusion,
    /// Additionally require at least one filter keyword in the description
    /// and keep a bounded snippet.
    KeywordMatch(KeywordMatcher),
}

/// Why a fetched listing was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeReason {
    BannedTitle,
    NegativeDescription,
    NoKeywordMatch,
}

impl fmt::Display for ExcludeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::BannedTitle => "banned title",
            Self::NegativeDescription => "negative keyword in description",
            Self::NoKeywordMatch => "no filter keyword in description",
        };
        f.write_str(reason)
    }
}

/// Result of one fetch task.
#[derive(Debug)]
pub enum ListingOutcome {
    Emitted(EnrichedRecord),
    Excluded(ExcludeReason),
    Failed(AppError),
}

/// Summary of an enrichment batch.
#[derive(Debug, Default)]
pub struct EnrichOutcome {
    /// Surviving records, in completion order
    pub records: Vec<EnrichedRecord>,
    pub skipped_existing: usize,
    pub excluded: usize,
    pub failures: usize,
}

/// Service fetching listing detail pages.
pub struct ListingEnricher {
    config: Arc<Config>,
    renderer: Arc<dyn Renderer>,
    rules: ExclusionRules,
    mode: EnrichMode,
}

impl ListingEnricher {
    pub fn new(config: Arc<Config>, renderer: Arc<dyn Renderer>, mode: EnrichMode) -> Self {
        let rules = ExclusionRules::from_config(&config);
        Self {
            config,
            renderer,
            rules,
            mode,
        }
    }

    /// Enrich every URL not already in `existing`.
    ///
    /// Individual failures are logged and counted; they never fail the batch.
    pub async fn enrich<I>(
        &self,
        urls: I,
        existing: &HashSet<String>,
        limit: usize,
    ) -> EnrichOutcome
    where
        I: IntoIterator<Item = String>,
    {
        let mut outcome = EnrichOutcome::default();
        let unique: BTreeSet<String> = urls.into_iter().collect();

        let pending: Vec<String> = unique
            .into_iter()
            .filter(|url| {
                let known = existing.contains(url);
                if known {
                    outcome.skipped_existing += 1;
                }
                !known
            })
            .collect();

        if outcome.skipped_existing > 0 {
            log::info!("Skipping {} already processed listings", outcome.skipped_existing);
        }
        log::info!(
            "Enriching {} listings with {} concurrent tasks",
            pending.len(),
            limit.max(1)
        );

        let mut tasks = stream::iter(pending)
            .map(|url| async move {
                let result = self.enrich_listing(&url).await;
                (url, result)
            })
            .buffer_unordered(limit.max(1));

        while let Some((url, result)) = tasks.next().await {
            match result {
                ListingOutcome::Emitted(record) => {
                    log::info!("Kept {}", url);
                    outcome.records.push(record);
                }
                ListingOutcome::Excluded(reason) => {
                    log::info!("Excluded {} ({})", url, reason);
                    outcome.excluded += 1;
                }
                ListingOutcome::Failed(error) => {
                    if error.is_transient() {
                        log::warn!("Failed listing {}: {}", url, error);
                    } else {
                        log::error!("Failed listing {}: {}", url, error);
                    }
                    outcome.failures += 1;
                }
            }
        }

        outcome
    }

    /// Fetch one listing in a fresh page context.
    ///
    /// The page is closed on every path.
    pub async fn enrich_listing(&self, url: &str) -> ListingOutcome {
        let mut page = match self.renderer.new_page().await {
            Ok(page) => page,
            Err(e) => return ListingOutcome::Failed(e),
        };
        let result = self.extract(page.as_mut(), url).await;
        page.close().await;

        match result {
            Ok(outcome) => outcome,
            Err(e) => ListingOutcome::Failed(e),
        }
    }

    async fn extract(&self, page: &mut dyn Page, url: &str) -> Result<ListingOutcome> {
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        page.navigate(url, timeouts.listing_navigation()).await?;
        dismiss_overlays(page, selectors, timeouts.overlay()).await;
        page.wait_for_selector(&selectors.title, timeouts.title_wait())
            .await?;

        let title = text_or_default(page, &selectors.title).await?;
        if self.rules.title_banned(&title) {
            return Ok(ListingOutcome::Excluded(ExcludeReason::BannedTitle));
        }

        let price = text_or_default(page, &selectors.price).await?;
        let shipping = text_or_default(page, &selectors.shipping).await?;
        let location = text_or_default(page, &selectors.location).await?;
        let date = text_or_default(page, &selectors.date).await?;
        let description = page
            .extract_multiline_text(&selectors.description)
            .await?
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        if self.rules.description_rejected(&description) {
            return Ok(ListingOutcome::Excluded(ExcludeReason::NegativeDescription));
        }

        let (description, matches) = match &self.mode {
            EnrichMode::Exclusion => (description, None),
            EnrichMode::KeywordMatch(matcher) => {
                let matches = matcher.matches(&description);
                if matches.is_empty() {
                    return Ok(ListingOutcome::Excluded(ExcludeReason::NoKeywordMatch));
                }
                (snippet(&description, SNIPPET_CHARS), Some(matches))
            }
        };

        Ok(ListingOutcome::Emitted(EnrichedRecord {
            url: url.to_string(),
            title,
            price,
            shipping,
            location,
            date,
            description,
            matches,
        }))
    }
}

async fn text_or_default(page: &dyn Page, selector: &str) -> Result<String> {
    Ok(page
        .extract_text(selector)
        .await?
        .unwrap_or_else(|| NOT_AVAILABLE.to_string()))
}

/// First `max` user-perceived characters of `text`.
///
/// Counts grapheme clusters, so a base letter and its combining marks are
/// never split.
pub fn snippet(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}
