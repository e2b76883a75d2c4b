//! File-backed URL cache, one JSON array per discovery partition.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::DiscoveryPartition;
use crate::storage::{UrlCache, read_bytes, write_json};

/// URL cache stored as `<root>/urls_<price>_page_<page>.json`.
pub struct LocalCache {
    root_dir: PathBuf,
    written: Mutex<HashSet<DiscoveryPartition>>,
}

impl LocalCache {
    /// Create a new cache rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            written: Mutex::new(HashSet::new()),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Cache file for a partition.
    pub fn path_for(&self, partition: &DiscoveryPartition) -> PathBuf {
        self.root_dir.join(partition.file_name())
    }

    /// Read one cache file.
    ///
    /// Returns `Ok(None)` when the file does not exist and
    /// [`AppError::CorruptCache`] when it cannot be read or parsed.
    pub async fn read_entry(path: &Path) -> Result<Option<Vec<String>>> {
        let bytes = match read_bytes(path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e) => return Err(AppError::corrupt_cache(path, e)),
        };
        serde_json::from_slice::<Vec<String>>(&bytes)
            .map(Some)
            .map_err(|e| AppError::corrupt_cache(path, e))
    }

    /// All cache files in lexical path order.
    pub async fn entries(&self) -> Result<Vec<PathBuf>> {
        let mut dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("urls_") && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[async_trait]
impl UrlCache for LocalCache {
    async fn get(&self, partition: &DiscoveryPartition) -> Option<Vec<String>> {
        let path = self.path_for(partition);
        match Self::read_entry(&path).await {
            Ok(urls) => urls,
            Err(e) => {
                log::warn!("Ignoring cache entry {}: {}", partition.cache_key(), e);
                None
            }
        }
    }

    async fn put(&self, partition: &DiscoveryPartition, urls: &[String]) -> Result<()> {
        let first_write = self
            .written
            .lock()
            .map(|mut written| written.insert(*partition))
            .unwrap_or(false);
        if !first_write {
            log::warn!(
                "Cache entry {} already written in this run, keeping the first",
                partition.cache_key()
            );
            return Ok(());
        }

        let path = self.path_for(partition);
        write_json(&path, urls).await?;
        log::debug!("Cached {} URLs in {}", urls.len(), path.display());
        Ok(())
    }
}
