// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Override file persistence.
//!
//! The whole override set is written as one pretty-printed JSON array. Saving
//! fails closed: any I/O or encoding problem is returned to the caller.
//! Loading fails open: a missing, unreadable or invalid file yields no overrides, with
//! [`OverridePersistence::load_outcome`] available to tell the cases apart.
//! Concurrent saves are not coordinated; the last write to complete wins.

use crate::config::LintConfig;
use crate::error::{LintError, Result};
use crate::overrides::{OverrideRecord, OverrideStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Result of reading the override file.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file was read and parsed.
    Loaded(Vec<OverrideRecord>),
    /// No file exists yet.
    Missing,
    /// The file exists but could not be read or parsed.
    Failed(LintError),
}

impl LoadOutcome {
    /// The loaded records, or none for a missing or broken file.
    #[must_use]
    pub fn into_records(self) -> Vec<OverrideRecord> {
        match self {
            Self::Loaded(records) => records,
            Self::Missing | Self::Failed(_) => Vec::new(),
        }
    }

    /// Whether loading failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Reads and writes the override file.
#[derive(Debug, Clone)]
pub struct OverridePersistence {
    path: PathBuf,
}

impl OverridePersistence {
    /// Persistence backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persistence at the location named by `config`.
    #[must_use]
    pub fn from_config(config: &LintConfig) -> Self {
        Self::new(config.override_path())
    }

    /// The override file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes all records, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be encoded or the file cannot
    /// be written.
    pub async fn save(&self, records: &[OverrideRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LintError::file_system(parent, e))?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| LintError::invalid_format("overrides", e.to_string()))?;

        fs::write(&self.path, json)
            .await
            .map_err(|e| LintError::file_system(&self.path, e))?;

        info!(
            "Saved {} override(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Saves the contents of `store`.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub async fn save_store(&self, store: &OverrideStore) -> Result<()> {
        self.save(&store.export_all()).await
    }

    /// Reads the override file, reporting why nothing was loaded.
    pub async fn load_outcome(&self) -> LoadOutcome {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No override file at {}", self.path.display());
                return LoadOutcome::Missing;
            }
            Err(e) => return LoadOutcome::Failed(LintError::file_system(&self.path, e)),
        };

        let records = match serde_json::from_str::<Vec<OverrideRecord>>(&content) {
            Ok(records) => records,
            Err(e) => {
                return LoadOutcome::Failed(LintError::invalid_format(
                    format!("override file {}", self.path.display()),
                    e.to_string(),
                ))
            }
        };

        match records.iter().try_for_each(OverrideRecord::validate) {
            Ok(()) => {
                debug!(
                    "Loaded {} override(s) from {}",
                    records.len(),
                    self.path.display()
                );
                LoadOutcome::Loaded(records)
            }
            Err(e) => LoadOutcome::Failed(e),
        }
    }

    /// Reads the override file, returning no records on any failure.
    pub async fn load(&self) -> Vec<OverrideRecord> {
        let outcome = self.load_outcome().await;
        if let LoadOutcome::Failed(e) = &outcome {
            warn!("Ignoring unreadable override file: {}", e);
        }
        outcome.into_records()
    }

    /// Loads the override file into a fresh store.
    ///
    /// Fails open like [`load`](Self::load): a file holding any invalid
    /// record yields an empty store.
    pub async fn load_store(&self) -> OverrideStore {
        let mut store = OverrideStore::new();
        if let Err(e) = store.import_all(self.load().await) {
            warn!("Ignoring override file: {}", e);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let persistence = OverridePersistence::new(dir.path().join("overrides.json"));

        assert!(matches!(persistence.load_outcome().await, LoadOutcome::Missing));
        assert!(persistence.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dir").join("overrides.json");
        let persistence = OverridePersistence::new(&path);

        let records = vec![OverrideRecord::new("wip", "drafts allowed").with_category("team")];
        persistence.save(&records).await.unwrap();

        assert!(path.exists());
        assert_eq!(persistence.load().await, records);
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, "{ not json").unwrap();
        let persistence = OverridePersistence::new(&path);

        assert!(persistence.load_outcome().await.is_failed());
        assert!(persistence.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_with_empty_reason_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, r#"[{"patternId":"wip","reason":""}]"#).unwrap();
        let persistence = OverridePersistence::new(&path);

        assert!(matches!(
            persistence.load_outcome().await,
            LoadOutcome::Failed(LintError::InvalidOverride { .. })
        ));
        assert!(persistence.load().await.is_empty());
        assert!(persistence.load_store().await.list().is_empty());
    }

    #[tokio::test]
    async fn test_one_bad_record_rejects_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(
            &path,
            r#"[{"patternId":"wip","reason":"drafts allowed"},{"patternId":" ","reason":"r"}]"#,
        )
        .unwrap();
        let persistence = OverridePersistence::new(&path);

        assert!(persistence.load_outcome().await.is_failed());
        assert!(!persistence.load_store().await.is_overridden("wip"));
    }

    #[tokio::test]
    async fn test_save_into_file_path_fails_closed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let persistence = OverridePersistence::new(blocker.join("overrides.json"));

        let result = persistence.save(&[OverrideRecord::new("wip", "r")]).await;
        assert!(matches!(result, Err(LintError::FileSystem { .. })));
    }

    #[test]
    fn test_store_round_trip_blocking() {
        let dir = TempDir::new().unwrap();
        let persistence = OverridePersistence::new(dir.path().join("overrides.json"));

        let mut store = OverrideStore::new();
        store.override_pattern("wip", "drafts allowed", None).unwrap();
        tokio_test::block_on(persistence.save_store(&store)).unwrap();

        let loaded = tokio_test::block_on(persistence.load_store());
        assert_eq!(loaded.export_all(), store.export_all());
    }
}
