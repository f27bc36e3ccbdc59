//! The module registry: one directory per active module.
//!
//! Layout: `<registry_root>/<module_name>/`, each carrying
//! `.module_metadata.json`. Hidden entries (`.staging-*`, `.trash-*`) are
//! transient and never reported.

use crate::fsutil::{hidden_sibling, is_hidden, move_dir, remove_dir_if_exists, swap_into_place};
use crate::metadata::{load_module_metadata, write_module_metadata, ModuleMetadata};
use crate::structure::{list_files, FileTreeEntry, ModuleStructure};
use crate::{ModdockError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A module directory found in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryModule {
    pub name: String,
    pub path: PathBuf,
}

/// Everything shown for a single module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDetails {
    pub module_name: String,
    /// `None` when the module directory has no metadata file.
    pub metadata: Option<ModuleMetadata>,
    pub file_tree: Vec<FileTreeEntry>,
}

/// Registry of active modules rooted at a single directory.
///
/// Mutating methods do not lock; callers serialize per module name
/// (see [`crate::locks::NameLocks`]).
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    root: PathBuf,
}

impl ModuleRegistry {
    /// Create a registry over `root`. The directory is not created here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the module `name`, whether or not it exists.
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.module_path(name).is_dir()
    }

    /// All module directories, sorted by name.
    pub fn list(&self) -> Result<Vec<RegistryModule>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ModdockError::io_with_path(e, &self.root)),
        };

        let mut modules = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ModdockError::io_with_path(e, &self.root))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if is_hidden(&name) || !entry.path().is_dir() {
                continue;
            }
            modules.push(RegistryModule {
                name,
                path: entry.path(),
            });
        }

        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modules)
    }

    // ========================================
    // Organization
    // ========================================

    /// Make the contents of `scratch` the module `name`, replacing any
    /// previous module of that name. `scratch` is consumed (moved).
    ///
    /// Returns the module directory.
    pub fn organize(&self, name: &str, scratch: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| ModdockError::io_with_path(e, &self.root))?;

        let target = self.module_path(name);
        let staged = hidden_sibling(&self.root, "staging", name);

        move_dir(scratch, &staged)?;
        if let Err(e) = swap_into_place(&staged, &target) {
            let _ = remove_dir_if_exists(&staged);
            return Err(e);
        }

        info!("Organized module {} at {}", name, target.display());
        Ok(target)
    }

    /// Write the metadata record for `name` from its detected structure.
    pub fn write_metadata(&self, name: &str, structure: &ModuleStructure) -> Result<ModuleMetadata> {
        let module_dir = self.module_path(name);
        if !module_dir.is_dir() {
            return Err(ModdockError::ModuleNotFound {
                name: name.to_string(),
            });
        }
        write_module_metadata(&module_dir, name, structure)
    }

    /// Metadata of `name`; `None` if the module has no metadata file.
    pub fn load_metadata(&self, name: &str) -> Result<Option<ModuleMetadata>> {
        let module_dir = self.require(name)?;
        load_module_metadata(&module_dir, name)
    }

    // ========================================
    // Queries and deletion
    // ========================================

    /// Metadata and file tree of `name`. The metadata file itself is not
    /// part of the tree.
    pub fn view(&self, name: &str) -> Result<ModuleDetails> {
        let module_dir = self.require(name)?;

        Ok(ModuleDetails {
            module_name: name.to_string(),
            metadata: load_module_metadata(&module_dir, name)?,
            file_tree: list_files(&module_dir)?,
        })
    }

    /// Remove `name` from the registry. Returns `false` if it was absent.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let deleted = remove_dir_if_exists(&self.module_path(name))?;
        if deleted {
            info!("Deleted module {}", name);
        } else {
            debug!("Delete of absent module {} ignored", name);
        }
        Ok(deleted)
    }

    fn require(&self, name: &str) -> Result<PathBuf> {
        let module_dir = self.module_path(name);
        if module_dir.is_dir() {
            Ok(module_dir)
        } else {
            Err(ModdockError::ModuleNotFound {
                name: name.to_string(),
            })
        }
    }
}
