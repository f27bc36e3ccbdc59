//! Advisory file locks.
//!
//! Serializes read-modify-write cycles on shared JSON documents across
//! processes. In-process callers still need their own mutex: advisory locks
//! are per open file description, not per task.

use crate::{ModdockError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
    path: PathBuf,
}

impl FileLockGuard {
    /// Block until an exclusive lock on `path` is held.
    ///
    /// The lock file is created if it does not exist and is never removed.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| ModdockError::io_with_path(e, path))?;

        file.lock_exclusive().map_err(|e| ModdockError::Io {
            message: format!("Failed to lock {}", path.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
