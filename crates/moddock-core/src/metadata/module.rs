//! The metadata record embedded in every module directory.

use crate::config::PathsConfig;
use crate::metadata::{atomic_read_json, atomic_write_json};
use crate::structure::ModuleStructure;
use crate::{ModdockError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `.module_metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    /// RFC 3339 upload timestamp.
    pub uploaded: String,
    pub structure: ModuleStructure,
    /// Absolute path of the module directory at upload time.
    pub path: PathBuf,
}

/// Read the metadata file of `module_dir`.
///
/// Returns `None` when the module has no metadata file. A file that does not
/// parse, or that names a different module, is [`ModdockError::CorruptMetadata`].
pub fn load_module_metadata(module_dir: &Path, name: &str) -> Result<Option<ModuleMetadata>> {
    let path = module_dir.join(PathsConfig::METADATA_FILENAME);

    let metadata: Option<ModuleMetadata> = match atomic_read_json(&path) {
        Ok(metadata) => metadata,
        Err(ModdockError::Json { message, .. }) => {
            return Err(ModdockError::CorruptMetadata { path, message });
        }
        Err(e) => return Err(e),
    };

    match metadata {
        Some(metadata) if metadata.name != name => Err(ModdockError::CorruptMetadata {
            path,
            message: format!(
                "metadata names module {:?}, expected {:?}",
                metadata.name, name
            ),
        }),
        other => Ok(other),
    }
}

/// Write a fresh metadata record for `name` into `module_dir`.
pub fn write_module_metadata(
    module_dir: &Path,
    name: &str,
    structure: &ModuleStructure,
) -> Result<ModuleMetadata> {
    let absolute = module_dir
        .canonicalize()
        .map_err(|e| ModdockError::io_with_path(e, module_dir))?;

    let metadata = ModuleMetadata {
        name: name.to_string(),
        uploaded: Utc::now().to_rfc3339(),
        structure: structure.clone(),
        path: absolute,
    };

    atomic_write_json(&module_dir.join(PathsConfig::METADATA_FILENAME), &metadata)?;
    Ok(metadata)
}
