//! The module store: promoted snapshots of registry modules.
//!
//! Layout: `<store_root>/<module_name>/` holds a full copy of the module as
//! it was when promoted, and `<store_root>/index.json` lists the entries.
//! Store copies are never synchronized with later registry changes.

mod index;

pub use index::{StoreEntry, StoreIndex, StoreIndexFile};

use crate::config::PathsConfig;
use crate::fsutil::{copy_dir_recursive, hidden_sibling, remove_dir_if_exists, swap_into_place};
use crate::registry::ModuleRegistry;
use crate::{ModdockError, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names that would collide with the index files in the store root.
fn is_reserved_name(name: &str) -> bool {
    name == PathsConfig::STORE_INDEX_FILENAME || name == PathsConfig::STORE_INDEX_LOCK_FILENAME
}

/// Store of promoted modules rooted at a single directory.
#[derive(Debug)]
pub struct ModuleStore {
    root: PathBuf,
    index: StoreIndexFile,
}

impl ModuleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let index = StoreIndexFile::new(&root);
        Self { root, index }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &StoreIndexFile {
        &self.index
    }

    /// Directory holding the store copy of `name`.
    pub fn copy_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Current index contents.
    pub fn load_index(&self) -> Result<StoreIndex> {
        self.index.load()
    }

    /// All entries, in index order.
    pub fn entries(&self) -> Result<Vec<StoreEntry>> {
        Ok(self.index.load()?.modules)
    }

    /// Copy the registry module `name` into the store and record it in the
    /// index, replacing any earlier copy and entry.
    pub async fn promote(&self, registry: &ModuleRegistry, name: &str) -> Result<StoreEntry> {
        if is_reserved_name(name) {
            return Err(ModdockError::InvalidModuleName {
                name: name.to_string(),
            });
        }

        let module_dir = registry.module_path(name);
        if !module_dir.is_dir() {
            return Err(ModdockError::ModuleNotFound {
                name: name.to_string(),
            });
        }

        let metadata = registry.load_metadata(name)?;

        std::fs::create_dir_all(&self.root).map_err(|e| ModdockError::io_with_path(e, &self.root))?;
        let staged = hidden_sibling(&self.root, "staging", name);
        let target = self.copy_path(name);

        let copied = {
            let staged = staged.clone();
            tokio::task::spawn_blocking(move || {
                let copied = copy_dir_recursive(&module_dir, &staged)?;
                swap_into_place(&staged, &target)?;
                Ok::<_, ModdockError>(copied)
            })
            .await
            .map_err(|e| ModdockError::Other(format!("Store copy task failed: {}", e)))?
        };
        let copied = match copied {
            Ok(copied) => copied,
            Err(e) => {
                let _ = remove_dir_if_exists(&staged);
                return Err(e);
            }
        };
        debug!("Copied {} files of {} into the store", copied, name);

        let entry = StoreEntry {
            name: name.to_string(),
            added: Utc::now().to_rfc3339(),
            metadata,
        };
        self.index.update(|index| index.upsert(entry.clone())).await?;

        info!("Promoted module {} to the store", name);
        Ok(entry)
    }

    /// Remove `name` from the index and delete its store copy.
    ///
    /// Absent names are not an error. Returns whether anything was removed.
    pub async fn demote(&self, name: &str) -> Result<bool> {
        if is_reserved_name(name) {
            return Err(ModdockError::InvalidModuleName {
                name: name.to_string(),
            });
        }

        let removed_entry = self.index.update(|index| index.remove(name)).await?;
        let removed_copy = remove_dir_if_exists(&self.copy_path(name))?;

        if removed_entry || removed_copy {
            info!("Removed module {} from the store", name);
        } else {
            debug!("Demote of absent store module {} ignored", name);
        }
        Ok(removed_entry || removed_copy)
    }
}
