// src/services/discovery.rs

//! Listing URL discovery over price/page partitions.
//!
//! Partitions are visited sequentially in ascending (price, page) order so
//! that cache keys stay stable across reruns. A failed partition yields no
//! URLs and is not cached; deleting a single cache file re-fetches just that
//! partition.

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;
use crate::models::{Config, DiscoveryPartition, TraversalMode};
use crate::renderer::{Page, Renderer};
use crate::services::overlays::dismiss_overlays;
use crate::storage::UrlCache;

/// Where the URLs of one partition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionUrls {
    Cached(Vec<String>),
    Fetched(Vec<String>),
    Failed,
}

/// Summary of a discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    /// Deduplicated listing URLs
    pub urls: BTreeSet<String>,
    pub partition_total: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    pub failures: usize,
}

/// Service discovering listing URLs from search result pages.
pub struct UrlDiscovery {
    config: Arc<Config>,
    renderer: Arc<dyn Renderer>,
    cache: Arc<dyn UrlCache>,
    listing_pattern: Regex,
}

impl UrlDiscovery {
    pub fn new(
        config: Arc<Config>,
        renderer: Arc<dyn Renderer>,
        cache: Arc<dyn UrlCache>,
    ) -> Result<Self> {
        let listing_pattern = config.selectors.listing_url_regex()?;
        Ok(Self {
            config,
            renderer,
            cache,
            listing_pattern,
        })
    }

    /// Visit every configured partition and union the discovered URLs.
    pub async fn discover(&self) -> DiscoveryOutcome {
        let partitions = TraversalMode::from_config(&self.config).partitions();
        let mut outcome = DiscoveryOutcome {
            partition_total: partitions.len(),
            ..DiscoveryOutcome::default()
        };

        for partition in &partitions {
            log::info!(
                "Crawling price {} / page {}",
                partition.price,
                partition.page
            );
            let urls = match self.urls_for(partition).await {
                PartitionUrls::Cached(urls) => {
                    outcome.cache_hits += 1;
                    urls
                }
                PartitionUrls::Fetched(urls) => {
                    outcome.fetched += 1;
                    urls
                }
                PartitionUrls::Failed => {
                    outcome.failures += 1;
                    continue;
                }
            };
            outcome.urls.extend(urls);
        }

        log::info!("Found {} unique URLs", outcome.urls.len());
        outcome
    }

    /// URLs of one partition: from cache, or fetched and then cached.
    pub async fn urls_for(&self, partition: &DiscoveryPartition) -> PartitionUrls {
        if let Some(urls) = self.cache.get(partition).await {
            log::debug!(
                "Cache hit {} ({} URLs)",
                partition.cache_key(),
                urls.len()
            );
            return PartitionUrls::Cached(urls);
        }

        match self.fetch_partition(partition).await {
            Ok(urls) => {
                if let Err(e) = self.cache.put(partition, &urls).await {
                    log::warn!("Failed to cache {}: {}", partition.cache_key(), e);
                }
                PartitionUrls::Fetched(urls)
            }
            Err(e) => {
                log::warn!(
                    "Failed page {} at price {}: {}",
                    partition.page,
                    partition.price,
                    e
                );
                PartitionUrls::Failed
            }
        }
    }

    /// Render one search page and extract its listing links.
    async fn fetch_partition(&self, partition: &DiscoveryPartition) -> Result<Vec<String>> {
        let url = self.config.search_url(partition);
        let mut page = self.renderer.new_page().await?;
        let result = self.extract_listing_urls(page.as_mut(), &url).await;
        page.close().await;
        result
    }

    async fn extract_listing_urls(&self, page: &mut dyn Page, url: &str) -> Result<Vec<String>> {
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        page.navigate(url, timeouts.discovery_navigation()).await?;
        dismiss_overlays(page, selectors, timeouts.overlay()).await;
        page.wait_for_selector(&selectors.results_anchor, timeouts.results_wait())
            .await?;

        let hrefs = page
            .extract_attributes_from_all(&selectors.results_anchor, "href")
            .await?;
        Ok(hrefs
            .into_iter()
            .filter(|href| self.listing_pattern.is_match(href))
            .collect())
    }
}
