// src/pipeline/stats.rs

//! Per-run counters reported at the end of every command.

use chrono::{DateTime, Utc};

use crate::services::{DiscoveryOutcome, EnrichOutcome};
use crate::utils::console;

/// Counters accumulated over one command run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub partitions: usize,
    pub cache_hits: usize,
    /// Partitions fetched through the renderer
    pub partitions_fetched: usize,
    pub partition_failures: usize,
    pub urls_discovered: usize,
    pub cache_batches: usize,
    pub skipped_existing: usize,
    pub listing_failures: usize,
    pub excluded: usize,
    pub emitted: usize,
    /// Records in the raw store after the final save
    pub saved_total: usize,
}

impl RunStats {
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            partitions: 0,
            cache_hits: 0,
            partitions_fetched: 0,
            partition_failures: 0,
            urls_discovered: 0,
            cache_batches: 0,
            skipped_existing: 0,
            listing_failures: 0,
            excluded: 0,
            emitted: 0,
            saved_total: 0,
        }
    }

    pub fn record_discovery(&mut self, outcome: &DiscoveryOutcome) {
        self.partitions += outcome.partition_total;
        self.cache_hits += outcome.cache_hits;
        self.partitions_fetched += outcome.fetched;
        self.partition_failures += outcome.failures;
        self.urls_discovered += outcome.urls.len();
    }

    pub fn record_enrichment(&mut self, outcome: &EnrichOutcome) {
        self.skipped_existing += outcome.skipped_existing;
        self.listing_failures += outcome.failures;
        self.excluded += outcome.excluded;
        self.emitted += outcome.records.len();
    }

    pub fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self
    }

    pub fn elapsed_secs(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }

    /// Log the counters as a summary section.
    pub fn log_summary(&self, title: &str) {
        let mut items = Vec::new();
        if self.partitions > 0 {
            items.push((
                "Partitions (cached / fetched)",
                format!(
                    "{} ({} / {})",
                    self.partitions, self.cache_hits, self.partitions_fetched
                ),
            ));
            items.push(("Partition failures", self.partition_failures.to_string()));
            items.push(("URLs discovered", self.urls_discovered.to_string()));
        }
        if self.cache_batches > 0 {
            items.push(("Cache batches", self.cache_batches.to_string()));
        }
        items.push(("Skipped (existing)", self.skipped_existing.to_string()));
        items.push(("Failed", self.listing_failures.to_string()));
        items.push(("Excluded", self.excluded.to_string()));
        items.push(("Kept", self.emitted.to_string()));
        items.push(("Raw store total", self.saved_total.to_string()));
        items.push(("Elapsed", format!("{}s", self.elapsed_secs())));
        console::summary(title, &items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrichedRecord;

    #[test]
    fn accumulates_outcomes() {
        let mut stats = RunStats::start();
        stats.record_discovery(&DiscoveryOutcome {
            urls: ["a".to_string(), "b".to_string()].into(),
            partition_total: 3,
            cache_hits: 2,
            fetched: 0,
            failures: 1,
        });
        let batch = EnrichOutcome {
            records: vec![EnrichedRecord {
                url: "a".into(),
                title: String::new(),
                price: String::new(),
                shipping: String::new(),
                location: String::new(),
                date: String::new(),
                description: String::new(),
                matches: None,
            }],
            skipped_existing: 1,
            excluded: 0,
            failures: 0,
        };
        stats.record_enrichment(&batch);
        stats.record_enrichment(&batch);

        let stats = stats.finish();
        assert_eq!(stats.partitions, 3);
        assert_eq!(stats.partition_failures, 1);
        assert_eq!(stats.urls_discovered, 2);
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.skipped_existing, 2);
        assert!(stats.end_time >= stats.start_time);
    }
}
