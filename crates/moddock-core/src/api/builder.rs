//! Builder for configuring ModuleManager initialization.

use std::path::PathBuf;

use crate::config::PathsConfig;
use crate::error::{ModdockError, Result};
use crate::locks::NameLocks;
use crate::registry::ModuleRegistry;
use crate::store::ModuleStore;
use crate::ModuleManager;

/// Builder for configuring ModuleManager initialization.
///
/// # Example
///
/// ```rust,ignore
/// use moddock_core::ModuleManager;
///
/// let manager = ModuleManager::builder("./data")
///     .auto_create_dirs(true)
///     .store_dir("/srv/shared-store")
///     .build()?;
/// ```
pub struct ModuleManagerBuilder {
    data_root: PathBuf,
    uploads_dir: Option<PathBuf>,
    modules_dir: Option<PathBuf>,
    store_dir: Option<PathBuf>,
    auto_create_dirs: bool,
}

impl ModuleManagerBuilder {
    /// Create a new builder with the data root directory.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            uploads_dir: None,
            modules_dir: None,
            store_dir: None,
            auto_create_dirs: false,
        }
    }

    /// Auto-create the data root and the uploads, modules and store
    /// directories if they don't exist.
    ///
    /// Default: `false` (the data root must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Override where uploads are persisted and extracted.
    ///
    /// Default: `<data_root>/uploads`
    pub fn uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = Some(dir.into());
        self
    }

    /// Override the registry root.
    ///
    /// Default: `<data_root>/modules`
    pub fn modules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modules_dir = Some(dir.into());
        self
    }

    /// Override the store root.
    ///
    /// Default: `<data_root>/store`
    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// Build the ModuleManager instance.
    pub fn build(self) -> Result<ModuleManager> {
        let uploads_root = self
            .uploads_dir
            .unwrap_or_else(|| self.data_root.join(PathsConfig::UPLOADS_DIR_NAME));
        let modules_root = self
            .modules_dir
            .unwrap_or_else(|| self.data_root.join(PathsConfig::MODULES_DIR_NAME));
        let store_root = self
            .store_dir
            .unwrap_or_else(|| self.data_root.join(PathsConfig::STORE_DIR_NAME));

        if self.auto_create_dirs {
            for dir in [&self.data_root, &uploads_root, &modules_root, &store_root] {
                std::fs::create_dir_all(dir).map_err(|e| ModdockError::Io {
                    message: format!("Failed to create directory: {}", dir.display()),
                    path: Some(dir.clone()),
                    source: Some(e),
                })?;
            }
        } else if !self.data_root.is_dir() {
            return Err(ModdockError::Config {
                message: format!("Data root does not exist: {}", self.data_root.display()),
            });
        }

        tracing::info!(
            "Module manager ready (uploads: {}, modules: {}, store: {})",
            uploads_root.display(),
            modules_root.display(),
            store_root.display()
        );

        Ok(ModuleManager {
            data_root: self.data_root,
            uploads_root,
            registry: ModuleRegistry::new(modules_root),
            store: ModuleStore::new(store_root),
            locks: NameLocks::new(),
        })
    }
}
