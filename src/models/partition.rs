// src/models/partition.rs

//! Discovery partitions: the (price, page) coordinates of the search space.

use serde::{Deserialize, Serialize};

use crate::models::Config;

/// One (price bucket, page) coordinate fetched and cached independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscoveryPartition {
    /// Minimum price filter of the search (flat mode: the configured minimum)
    pub price: u32,

    /// 1-based result page
    pub page: u32,
}

impl DiscoveryPartition {
    pub fn new(price: u32, page: u32) -> Self {
        Self { price, page }
    }

    /// Stable cache key, e.g. `urls_50_page_2`.
    pub fn cache_key(&self) -> String {
        format!("urls_{}_page_{}", self.price, self.page)
    }

    /// Cache file name for this partition.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.cache_key())
    }

    /// Recover a partition from a cache file name produced by [`Self::file_name`].
    pub fn from_file_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("urls_")?.strip_suffix(".json")?;
        let (price, page) = rest.split_once("_page_")?;
        Some(Self {
            price: price.parse().ok()?,
            page: page.parse().ok()?,
        })
    }
}

/// How the search space is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// Every price in `[price_min, price_max]`, pages `1..=pages_per_step` each
    Stepped {
        price_min: u32,
        price_max: u32,
        pages_per_step: u32,
    },
    /// Pages `1..=pages` at a single placeholder price
    Flat { price: u32, pages: u32 },
}

impl TraversalMode {
    pub fn from_config(config: &Config) -> Self {
        if config.use_price_stepping {
            Self::Stepped {
                price_min: config.price_min,
                price_max: config.price_max,
                pages_per_step: config.pages_per_price_step,
            }
        } else {
            Self::Flat {
                price: config.price_min,
                pages: config.pages,
            }
        }
    }

    /// All partitions in visiting order: ascending price, then ascending page.
    pub fn partitions(&self) -> Vec<DiscoveryPartition> {
        match *self {
            Self::Stepped {
                price_min,
                price_max,
                pages_per_step,
            } => (price_min..=price_max)
                .flat_map(|price| {
                    (1..=pages_per_step).map(move |page| DiscoveryPartition::new(price, page))
                })
                .collect(),
            Self::Flat { price, pages } => (1..=pages)
                .map(|page| DiscoveryPartition::new(price, page))
                .collect(),
        }
    }
}
