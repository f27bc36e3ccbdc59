//! moddock core - headless library for module ingestion and storage.
//!
//! Uploaded `.zip` archives are extracted, classified by their file names,
//! and organized into a registry of module directories. Registry modules can
//! be promoted into a store, which keeps a physical snapshot of each module
//! plus a JSON index. This crate has no HTTP layer; see `moddock-server`.
//!
//! # Example
//!
//! ```rust,ignore
//! use moddock_core::ModuleManager;
//!
//! #[tokio::main]
//! async fn main() -> moddock_core::Result<()> {
//!     let manager = ModuleManager::new("./data")?;
//!
//!     let bytes = std::fs::read("sample.zip")?;
//!     let outcome = manager.upload("sample.zip", None, &bytes).await?;
//!     println!("Uploaded {}", outcome.module_name);
//!
//!     manager.add_to_store(&outcome.module_name).await?;
//!     println!("{} modules in store", manager.store_entries()?.len());
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod locks;
pub mod metadata;
pub mod naming;
pub mod registry;
pub mod responses;
pub mod store;
pub mod structure;

mod api;
mod fsutil;

pub use error::{ModdockError, Result};
pub use locks::NameLocks;
pub use metadata::ModuleMetadata;
pub use registry::{ModuleDetails, ModuleRegistry, RegistryModule};
pub use responses::{ModuleListing, ModuleSummary, UploadOutcome};
pub use store::{ModuleStore, StoreEntry, StoreIndex};
pub use structure::{FileTreeEntry, ModuleStructure, ModuleType};

pub use api::ModuleManagerBuilder;

use std::path::{Path, PathBuf};

/// Main entry point for module operations.
///
/// Owns the uploads root, the [`ModuleRegistry`] and the [`ModuleStore`],
/// and serializes operations on the same module name.
#[derive(Debug)]
pub struct ModuleManager {
    data_root: PathBuf,
    uploads_root: PathBuf,
    registry: ModuleRegistry,
    store: ModuleStore,
    locks: NameLocks,
}

impl ModuleManager {
    /// Create a builder for ModuleManager.
    pub fn builder(data_root: impl Into<PathBuf>) -> ModuleManagerBuilder {
        ModuleManagerBuilder::new(data_root)
    }

    /// Create a manager over `data_root` with the default layout, creating
    /// missing directories.
    pub fn new(data_root: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(data_root).auto_create_dirs(true).build()
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn uploads_root(&self) -> &Path {
        &self.uploads_root
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ModuleStore {
        &self.store
    }
}
