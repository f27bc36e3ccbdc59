//! Result types returned by [`crate::ModuleManager`] operations.

use crate::metadata::ModuleMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One registry module as shown in the module list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    pub path: PathBuf,
    /// Whether the store index has an entry of the same name.
    pub in_store: bool,
}

/// The registry listing plus the size of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleListing {
    pub modules: Vec<ModuleSummary>,
    pub store_count: usize,
}

/// A successfully ingested upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub module_name: String,
    pub metadata: ModuleMetadata,
}
