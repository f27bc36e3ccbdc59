//! Atomic file operations for JSON persistence.
//!
//! Writes go to a sibling temp file carrying a unique suffix, are fsynced,
//! and are then renamed over the target so readers only ever see a complete
//! document.

use crate::{ModdockError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist. A file that exists but does not
/// parse yields [`ModdockError::Json`].
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ModdockError::io_with_path(e, path)),
    };

    let data: T = serde_json::from_str(&contents).map_err(|e| ModdockError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write data to a JSON file atomically.
///
/// The parent directory is created if missing. The document is pretty
/// printed, matching what the store index and module metadata files have
/// always looked like on disk.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ModdockError::io_with_path(e, parent))?;
        }
    }

    let temp_path = temp_path_for(path);

    let serialized = serde_json::to_string_pretty(data).map_err(|e| ModdockError::Json {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        source: Some(e),
    })?;

    let written = write_and_sync(&temp_path, serialized.as_bytes());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ModdockError::Io {
            message: format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path: Some(path.to_path_buf()),
            source: Some(e),
        });
    }

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_and_sync(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| ModdockError::io_with_path(e, temp_path))?;

    file.write_all(bytes)
        .map_err(|e| ModdockError::io_with_path(e, temp_path))?;
    file.sync_all()
        .map_err(|e| ModdockError::io_with_path(e, temp_path))?;
    Ok(())
}

/// Unique temp file next to `path`: `<name>.<pid>.<uuid>.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "data.json".to_string());
    let unique = format!(
        "{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    );
    path.with_file_name(unique)
}
