// src/pipeline/persist.rs

//! Raw store session and incremental flush policy.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::EnrichedRecord;
use crate::storage::ResultStore;

/// Accumulated raw records of one run.
///
/// Opening a session loads the prior raw records. The first save moves the
/// raw file to a backup, and every save writes the complete collection: prior
/// records plus everything enriched in this run. Until that first save the raw
/// file stays in place, so an interrupted run leaves it untouched. A record
/// enriched again replaces the prior one with the same URL in place.
pub struct RawResults<'a> {
    store: &'a ResultStore,
    records: Vec<EnrichedRecord>,
    positions: HashMap<String, usize>,
    backed_up: bool,
}

impl<'a> RawResults<'a> {
    pub async fn open(store: &'a ResultStore) -> Result<Self> {
        let prior = store.load_raw().await;

        let mut results = Self {
            store,
            records: Vec::with_capacity(prior.len()),
            positions: HashMap::new(),
            backed_up: false,
        };
        results.extend(prior);
        Ok(results)
    }

    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = EnrichedRecord>,
    {
        for record in records {
            match self.positions.get(&record.url) {
                Some(&index) => self.records[index] = record,
                None => {
                    self.positions.insert(record.url.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }
    }

    /// Overwrite the raw store with the whole collection.
    pub async fn save(&mut self) -> Result<usize> {
        if !self.backed_up {
            self.store.backup().await?;
            self.backed_up = true;
        }
        self.store.save(&self.records).await?;
        Ok(self.records.len())
    }
}

/// Decides when accumulated results are flushed during a long run.
#[derive(Debug, Clone, Copy)]
pub struct FlushPolicy {
    interval: usize,
    processed: usize,
}

impl FlushPolicy {
    pub fn every(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            processed: 0,
        }
    }

    /// Count one processed batch; true when a flush is due.
    pub fn batch_done(&mut self) -> bool {
        self.processed += 1;
        self.processed % self.interval == 0
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str, title: &str) -> EnrichedRecord {
        EnrichedRecord {
            url: url.to_string(),
            title: title.to_string(),
            price: "1 €".to_string(),
            shipping: "N/A".to_string(),
            location: "Köln".to_string(),
            date: "heute".to_string(),
            description: "text".to_string(),
            matches: None,
        }
    }

    fn store(tmp: &TempDir) -> ResultStore {
        ResultStore::new(
            tmp.path().join("results.json"),
            tmp.path().join("cleaned.json"),
            tmp.path().join("backup"),
        )
    }

    #[test]
    fn flush_every_third_batch() {
        let mut policy = FlushPolicy::every(3);
        let due: Vec<bool> = (0..7).map(|_| policy.batch_done()).collect();
        assert_eq!(due, vec![false, false, true, false, false, true, false]);
        assert_eq!(policy.processed(), 7);
    }

    #[tokio::test]
    async fn first_save_backs_up_prior_records_once() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.save(&[record("a", "old")]).await.unwrap();

        let mut results = RawResults::open(&store).await.unwrap();
        results.extend([record("b", "new"), record("a", "replaced")]);
        assert_eq!(results.save().await.unwrap(), 2);
        results.extend([record("c", "later")]);
        assert_eq!(results.save().await.unwrap(), 3);

        let saved = store.load_raw().await;
        assert_eq!(saved[0], record("a", "replaced"));
        assert_eq!(saved[1], record("b", "new"));
        assert_eq!(std::fs::read_dir(tmp.path().join("backup")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn raw_store_untouched_until_first_save() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.save(&[record("a", "old")]).await.unwrap();

        let mut results = RawResults::open(&store).await.unwrap();
        results.extend([record("b", "new")]);
        drop(results);

        assert_eq!(store.load_raw().await, vec![record("a", "old")]);
        assert!(!tmp.path().join("backup").exists());
    }

    #[tokio::test]
    async fn open_without_raw_store_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let mut results = RawResults::open(&store).await.unwrap();
        assert_eq!(results.save().await.unwrap(), 0);
        assert!(!tmp.path().join("backup").exists());
    }
}
