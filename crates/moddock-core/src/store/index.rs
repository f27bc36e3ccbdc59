//! The store index document (`<store_root>/index.json`).
//!
//! The index is always rewritten in full. Read-modify-write cycles go through
//! [`StoreIndexFile::update`], which holds an in-process mutex and an
//! exclusive advisory lock on `index.json.lock` for the whole cycle.

use crate::config::PathsConfig;
use crate::metadata::{atomic_read_json, atomic_write_json, FileLockGuard, ModuleMetadata};
use crate::{ModdockError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// One promoted module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub name: String,
    /// RFC 3339 promotion timestamp.
    pub added: String,
    /// Module metadata at promotion time. Older indexes wrote `{}` for
    /// modules without metadata; that reads back as `None`.
    #[serde(default, deserialize_with = "metadata_or_empty")]
    pub metadata: Option<ModuleMetadata>,
}

fn metadata_or_empty<'de, D>(deserializer: D) -> std::result::Result<Option<ModuleMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// In-memory form of the index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIndex {
    #[serde(default)]
    pub modules: Vec<StoreEntry>,
}

impl StoreIndex {
    /// Replace any entry named like `entry`, appending it at the end.
    pub fn upsert(&mut self, entry: StoreEntry) {
        self.modules.retain(|m| m.name != entry.name);
        self.modules.push(entry);
    }

    /// Drop every entry named `name`. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.modules.len();
        self.modules.retain(|m| m.name != name);
        self.modules.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&StoreEntry> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entry names, for repeated membership checks.
    pub fn names(&self) -> HashSet<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The on-disk index document and its writer discipline.
#[derive(Debug)]
pub struct StoreIndexFile {
    path: PathBuf,
    lock_path: PathBuf,
    writer: Mutex<()>,
}

impl StoreIndexFile {
    /// Index document under `store_root`.
    pub fn new(store_root: &Path) -> Self {
        Self {
            path: store_root.join(PathsConfig::STORE_INDEX_FILENAME),
            lock_path: store_root.join(PathsConfig::STORE_INDEX_LOCK_FILENAME),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the index; a missing document is an empty index.
    pub fn load(&self) -> Result<StoreIndex> {
        match atomic_read_json::<StoreIndex>(&self.path) {
            Ok(index) => Ok(index.unwrap_or_default()),
            Err(ModdockError::Json { message, .. }) => Err(ModdockError::CorruptIndex {
                path: self.path.clone(),
                message,
            }),
            Err(e) => Err(e),
        }
    }

    /// Rewrite the whole document from `index`.
    pub fn save(&self, index: &StoreIndex) -> Result<()> {
        atomic_write_json(&self.path, index)?;
        debug!("Saved store index with {} entries", index.len());
        Ok(())
    }

    /// Load, apply `mutate`, and save while holding the writer locks.
    ///
    /// A corrupt index aborts the cycle before `mutate` runs and leaves the
    /// document untouched.
    pub async fn update<T>(&self, mutate: impl FnOnce(&mut StoreIndex) -> T) -> Result<T> {
        let _writer = self.writer.lock().await;

        // Another process may hold the lock for a while; wait off the runtime.
        let lock_path = self.lock_path.clone();
        let _file_lock = tokio::task::spawn_blocking(move || {
            if let Some(parent) = lock_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ModdockError::io_with_path(e, parent))?;
            }
            FileLockGuard::acquire(&lock_path)
        })
        .await
        .map_err(|e| ModdockError::Other(format!("Index lock task failed: {}", e)))??;

        let mut index = self.load()?;
        let out = mutate(&mut index);
        self.save(&index)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, added: &str) -> StoreEntry {
        StoreEntry {
            name: name.to_string(),
            added: added.to_string(),
            metadata: None,
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = StoreIndexFile::new(temp_dir.path());
        assert_eq!(file.load().unwrap(), StoreIndex::default());
    }

    #[test]
    fn test_load_corrupt_index() {
        let temp_dir = TempDir::new().unwrap();
        let file = StoreIndexFile::new(temp_dir.path());
        std::fs::write(file.path(), "{\"modules\": [").unwrap();

        assert!(matches!(
            file.load(),
            Err(ModdockError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file = StoreIndexFile::new(temp_dir.path());

        let mut index = StoreIndex::default();
        index.upsert(entry("b", "2026-01-02T00:00:00+00:00"));
        index.upsert(entry("a", "2026-01-01T00:00:00+00:00"));
        file.save(&index).unwrap();

        let first = std::fs::read_to_string(file.path()).unwrap();
        let loaded = file.load().unwrap();
        assert_eq!(loaded, index);

        file.save(&loaded).unwrap();
        let second = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_upsert_keeps_single_newest_entry() {
        let mut index = StoreIndex::default();
        index.upsert(entry("sample", "2026-01-01T00:00:00+00:00"));
        index.upsert(entry("other", "2026-01-01T00:00:00+00:00"));
        index.upsert(entry("sample", "2026-02-01T00:00:00+00:00"));

        let matching: Vec<&StoreEntry> =
            index.modules.iter().filter(|m| m.name == "sample").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].added, "2026-02-01T00:00:00+00:00");
        assert_eq!(index.modules.last().unwrap().name, "sample");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut index = StoreIndex::default();
        index.upsert(entry("sample", "t"));

        assert!(index.remove("sample"));
        let after_first = index.clone();
        assert!(!index.remove("sample"));
        assert_eq!(index, after_first);
        assert!(index.is_empty());
    }

    #[test]
    fn test_reads_legacy_empty_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let file = StoreIndexFile::new(temp_dir.path());
        std::fs::write(
            file.path(),
            r#"{"modules": [{"name": "old", "added": "2024-05-01T12:00:00", "metadata": {}}]}"#,
        )
        .unwrap();

        let index = file.load().unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get("old").unwrap().metadata.is_none());
        assert!(index.names().contains("old"));
    }

    #[tokio::test]
    async fn test_update_persists() {
        let temp_dir = TempDir::new().unwrap();
        let file = StoreIndexFile::new(&temp_dir.path().join("store"));

        let removed = file
            .update(|index| {
                index.upsert(entry("sample", "t"));
                index.remove("missing")
            })
            .await
            .unwrap();

        assert!(!removed);
        assert!(file.load().unwrap().contains("sample"));
    }

    #[tokio::test]
    async fn test_update_refuses_corrupt_index() {
        let temp_dir = TempDir::new().unwrap();
        let file = StoreIndexFile::new(temp_dir.path());
        std::fs::write(file.path(), "garbage").unwrap();

        let result = file.update(|index| index.upsert(entry("x", "t"))).await;
        assert!(matches!(result, Err(ModdockError::CorruptIndex { .. })));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "garbage");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_are_not_lost() {
        let temp_dir = TempDir::new().unwrap();
        let file = std::sync::Arc::new(StoreIndexFile::new(temp_dir.path()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let file = file.clone();
            handles.push(tokio::spawn(async move {
                file.update(|index| index.upsert(entry(&format!("m{i}"), "t")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(file.load().unwrap().len(), 16);
    }
}
