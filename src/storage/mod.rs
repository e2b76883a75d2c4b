//! Storage for discovered URLs and enriched results.
//!
//! ## Directory Structure
//!
//! ```text
//! {cache_folder}/
//! └── urls_<price>_page_<page>.json      # one URL list per discovery partition
//! {output_json}                          # raw results (overwritten per save)
//! {output_cleaned_json}                  # cleaned results (append-only)
//! {backup_folder}/
//! ├── results_backup_<YYYYMMDD_HHMMSS>.json
//! ├── cleaned_backup_<YYYYMMDD_HHMMSS>.json  # only for a corrupt cleaned store
//! └── excluded_links_<YYYYMMDD_HHMMSS>.json
//! ```
//!
//! Every write goes to a temporary sibling first and is then renamed into place.

pub mod cache;
pub mod results;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::DiscoveryPartition;

// Re-export for convenience
pub use cache::LocalCache;
pub use results::ResultStore;

/// Per-partition store of discovered listing URLs.
///
/// Entries are written once and reused until deleted out-of-band; there is
/// no invalidation.
#[async_trait]
pub trait UrlCache: Send + Sync {
    /// Cached URLs for `partition`.
    ///
    /// Unreadable or malformed entries are logged and reported as absent.
    async fn get(&self, partition: &DiscoveryPartition) -> Option<Vec<String>>;

    /// Persist the URLs discovered for `partition`.
    async fn put(&self, partition: &DiscoveryPartition, urls: &[String]) -> Result<()>;
}

/// Ensure parent directory exists.
async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Write pretty-printed JSON atomically.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes).await
}

/// Read bytes, returning None if file doesn't exist.
async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// First non-existing `<dir>/<stem>_<timestamp>[_n].json`.
async fn timestamped_path(dir: &Path, stem: &str) -> Result<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut candidate = dir.join(format!("{stem}_{timestamp}.json"));
    let mut n = 1;
    while tokio::fs::try_exists(&candidate).await? {
        candidate = dir.join(format!("{stem}_{timestamp}_{n}.json"));
        n += 1;
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/test.json");

        write_bytes(&path, b"hello").await.unwrap();
        let data = read_bytes(&path).await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let data = read_bytes(&tmp.path().join("nope.json")).await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn timestamped_paths_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let first = timestamped_path(tmp.path(), "results_backup").await.unwrap();
        write_bytes(&first, b"[]").await.unwrap();
        let second = timestamped_path(tmp.path(), "results_backup").await.unwrap();
        assert_ne!(first, second);

        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("results_backup_"));
        // results_backup_YYYYMMDD_HHMMSS.json
        assert_eq!(name.len(), "results_backup_".len() + 15 + ".json".len());
    }
}
