//! Raw and cleaned result files, backups and exclusion audit files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Config, EnrichedRecord};
use crate::storage::{read_bytes, timestamped_path, write_json};

/// Local filesystem result store.
#[derive(Debug, Clone)]
pub struct ResultStore {
    raw_path: PathBuf,
    cleaned_path: PathBuf,
    backup_dir: PathBuf,
}

impl ResultStore {
    pub fn new(
        raw_path: impl Into<PathBuf>,
        cleaned_path: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            raw_path: raw_path.into(),
            cleaned_path: cleaned_path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.output_json,
            &config.output_cleaned_json,
            &config.backup_folder,
        )
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    pub fn cleaned_path(&self) -> &Path {
        &self.cleaned_path
    }

    /// Read a result file.
    ///
    /// Returns `Ok(None)` when the file does not exist and
    /// [`AppError::CorruptStore`] when it is unreadable, not a JSON array of
    /// records, or contains a record without a URL.
    pub async fn read_records(path: &Path) -> Result<Option<Vec<EnrichedRecord>>> {
        let bytes = match read_bytes(path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e) => return Err(AppError::corrupt_store(path, e)),
        };
        let records: Vec<EnrichedRecord> =
            serde_json::from_slice(&bytes).map_err(|e| AppError::corrupt_store(path, e))?;

        if let Some(position) = records.iter().position(|r| !r.has_valid_url()) {
            return Err(AppError::corrupt_store(
                path,
                format!("record {position} has no url"),
            ));
        }
        Ok(Some(records))
    }

    /// Records of a result file; absent or corrupt files count as empty.
    async fn load_tolerant(path: &Path) -> Vec<EnrichedRecord> {
        match Self::read_records(path).await {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                log::warn!("{}; treating it as empty", e);
                Vec::new()
            }
        }
    }

    /// Records of the raw store.
    pub async fn load_raw(&self) -> Vec<EnrichedRecord> {
        Self::load_tolerant(&self.raw_path).await
    }

    /// Records of the cleaned store.
    pub async fn load_cleaned(&self) -> Vec<EnrichedRecord> {
        Self::load_tolerant(&self.cleaned_path).await
    }

    /// Union of the URLs present in the raw and cleaned stores.
    pub async fn load_existing_links(&self) -> HashSet<String> {
        let mut links: HashSet<String> = self
            .load_raw()
            .await
            .into_iter()
            .map(|r| r.url)
            .collect();
        links.extend(self.load_cleaned().await.into_iter().map(|r| r.url));
        links
    }

    /// Cleaned records to append to.
    ///
    /// A corrupt cleaned store counts as empty and is first moved to
    /// `cleaned_backup_<timestamp>.json`, since the next save replaces it.
    pub async fn load_cleaned_for_append(&self) -> Result<Vec<EnrichedRecord>> {
        match Self::read_records(&self.cleaned_path).await {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(e) => {
                log::warn!("{}; treating it as empty", e);
                self.backup_cleaned().await?;
                Ok(Vec::new())
            }
        }
    }

    /// Move the current raw store to `results_backup_<timestamp>.json`.
    ///
    /// Returns the backup path, or `None` if there was no raw store.
    pub async fn backup(&self) -> Result<Option<PathBuf>> {
        self.move_to_backup(&self.raw_path, "results_backup").await
    }

    /// Move the current cleaned store to `cleaned_backup_<timestamp>.json`.
    pub async fn backup_cleaned(&self) -> Result<Option<PathBuf>> {
        self.move_to_backup(&self.cleaned_path, "cleaned_backup").await
    }

    async fn move_to_backup(&self, path: &Path, prefix: &str) -> Result<Option<PathBuf>> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.backup_dir).await?;
        let target = timestamped_path(&self.backup_dir, prefix).await?;

        if tokio::fs::rename(path, &target).await.is_err() {
            // Rename fails across filesystems.
            tokio::fs::copy(path, &target).await?;
            tokio::fs::remove_file(path).await?;
        }

        log::info!("Backed up {} to {}", path.display(), target.display());
        Ok(Some(target))
    }

    /// Overwrite the raw store with the complete record collection.
    pub async fn save(&self, records: &[EnrichedRecord]) -> Result<()> {
        write_json(&self.raw_path, records).await?;
        log::info!(
            "Saved {} records to {}",
            records.len(),
            self.raw_path.display()
        );
        Ok(())
    }

    /// Overwrite the cleaned store with the complete cleaned collection.
    pub async fn save_cleaned(&self, records: &[EnrichedRecord]) -> Result<()> {
        write_json(&self.cleaned_path, records).await?;
        log::info!(
            "Saved {} cleaned records to {}",
            records.len(),
            self.cleaned_path.display()
        );
        Ok(())
    }

    /// Write excluded URLs to `excluded_links_<timestamp>.json`.
    ///
    /// Nothing is written for an empty list.
    pub async fn save_excluded(&self, urls: &[String]) -> Result<Option<PathBuf>> {
        if urls.is_empty() {
            return Ok(None);
        }
        let target = timestamped_path(&self.backup_dir, "excluded_links").await?;
        write_json(&target, urls).await?;
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;
    use tempfile::TempDir;

    fn record(url: &str) -> EnrichedRecord {
        EnrichedRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            price: "10 €".to_string(),
            shipping: NOT_AVAILABLE.to_string(),
            location: "Hamburg".to_string(),
            date: "today".to_string(),
            description: "desc".to_string(),
            matches: None,
        }
    }

    fn store(tmp: &TempDir) -> ResultStore {
        ResultStore::new(
            tmp.path().join("output/results.json"),
            tmp.path().join("output/results_cleaned.json"),
            tmp.path().join("backup"),
        )
    }

    #[tokio::test]
    async fn save_then_load_raw() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let records = vec![record("a"), record("b")];

        store.save(&records).await.unwrap();

        assert_eq!(store.load_raw().await, records);
    }

    #[tokio::test]
    async fn existing_links_union_raw_and_cleaned() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.save(&[record("a"), record("b")]).await.unwrap();
        store.save_cleaned(&[record("b"), record("c")]).await.unwrap();

        let links = store.load_existing_links().await;
        let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(links, expected);
    }

    #[tokio::test]
    async fn existing_links_tolerate_missing_and_corrupt_files() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(store.load_existing_links().await.is_empty());

        std::fs::create_dir_all(tmp.path().join("output")).unwrap();
        std::fs::write(store.raw_path(), "[{\"url\": ").unwrap();
        store.save_cleaned(&[record("c")]).await.unwrap();

        let links = store.load_existing_links().await;
        assert_eq!(links.len(), 1);
        assert!(links.contains("c"));
    }

    #[tokio::test]
    async fn record_without_url_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.json");
        std::fs::write(&path, r#"[{"url": "a"}, {"title": "no url"}]"#).unwrap();

        assert!(matches!(
            ResultStore::read_records(&path).await,
            Err(AppError::CorruptStore { .. })
        ));
    }

    #[tokio::test]
    async fn backup_without_raw_store_is_noop() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert_eq!(store.backup().await.unwrap(), None);
        assert!(!tmp.path().join("backup").exists());
    }

    #[tokio::test]
    async fn backup_preserves_previous_content_exactly() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.save(&[record("old")]).await.unwrap();
        let before = std::fs::read(store.raw_path()).unwrap();

        let backup = store.backup().await.unwrap().unwrap();
        assert!(!store.raw_path().exists());
        store.save(&[record("new")]).await.unwrap();

        assert_eq!(std::fs::read(&backup).unwrap(), before);
        assert_eq!(store.load_raw().await, vec![record("new")]);
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("results_backup_"));
    }

    #[tokio::test]
    async fn corrupt_cleaned_store_is_moved_aside_before_append() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        std::fs::create_dir_all(tmp.path().join("output")).unwrap();
        let corrupt = r#"[{"url": "a"}, {"title": "edited"}]"#;
        std::fs::write(store.cleaned_path(), corrupt).unwrap();

        assert!(store.load_cleaned_for_append().await.unwrap().is_empty());

        assert!(!store.cleaned_path().exists());
        let backups: Vec<_> = std::fs::read_dir(tmp.path().join("backup"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), corrupt);
        let name = backups[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cleaned_backup_"));
    }

    #[tokio::test]
    async fn valid_cleaned_store_is_loaded_in_place() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.save_cleaned(&[record("a")]).await.unwrap();

        assert_eq!(store.load_cleaned_for_append().await.unwrap(), vec![record("a")]);
        assert!(store.cleaned_path().exists());
        assert!(!tmp.path().join("backup").exists());
    }

    #[tokio::test]
    async fn excluded_links_written_only_when_non_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        assert_eq!(store.save_excluded(&[]).await.unwrap(), None);

        let path = store
            .save_excluded(&["x".to_string()])
            .await
            .unwrap()
            .unwrap();
        let saved: Vec<String> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved, vec!["x".to_string()]);
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("excluded_links_")
        );
    }
}
