//! Archive intake: extension checks, upload persistence and extraction.
//!
//! The upload artifact and the scratch directory are scoped guards; they
//! delete what they own when dropped, so every exit path of the upload
//! pipeline cleans up after itself.

mod extract;

pub use extract::extract_zip;

use crate::config::{PathsConfig, UploadConfig};
use crate::fsutil::remove_dir_if_exists;
use crate::{ModdockError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Whether `filename` carries an allowed archive extension.
pub fn is_allowed_archive(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => UploadConfig::ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Reject `filename` with [`ModdockError::UnsupportedFileType`] unless it is
/// an allowed archive.
pub fn ensure_allowed_archive(filename: &str) -> Result<()> {
    if is_allowed_archive(filename) {
        Ok(())
    } else {
        Err(ModdockError::UnsupportedFileType {
            filename: filename.to_string(),
        })
    }
}

/// An uploaded archive persisted under the uploads root. Deleted on drop.
#[derive(Debug)]
pub struct UploadArtifact {
    path: PathBuf,
}

impl UploadArtifact {
    /// Write `data` to a uniquely named file for `filename` under `uploads_root`.
    pub fn persist(uploads_root: &Path, filename: &str, data: &[u8]) -> Result<Self> {
        fs::create_dir_all(uploads_root)
            .map_err(|e| ModdockError::io_with_path(e, uploads_root))?;

        let path = uploads_root.join(format!(
            "{}-{}",
            uuid::Uuid::new_v4().simple(),
            filename
        ));
        // Own the path before writing so a failed write is cleaned up too.
        let artifact = Self { path };
        fs::write(&artifact.path, data).map_err(|e| ModdockError::io_with_path(e, &artifact.path))?;

        debug!("Persisted upload {} ({} bytes)", artifact.path.display(), data.len());
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload artifact {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {}: {}", self.path.display(), e),
        }
    }
}

/// Extraction target for one module. Deleted on drop unless released.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    /// Create `<uploads_root>/extracted_<module_name>`, clearing leftovers
    /// from an earlier run.
    pub fn create(uploads_root: &Path, module_name: &str) -> Result<Self> {
        let path = uploads_root.join(format!("{}{}", PathsConfig::SCRATCH_DIR_PREFIX, module_name));
        if remove_dir_if_exists(&path)? {
            debug!("Removed stale scratch directory {}", path.display());
        }
        fs::create_dir_all(&path).map_err(|e| ModdockError::io_with_path(e, &path))?;
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop owning the directory, e.g. once it has been moved elsewhere.
    pub fn release(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match remove_dir_if_exists(&self.path) {
            Ok(true) => debug!("Removed scratch directory {}", self.path.display()),
            Ok(false) => {}
            Err(e) => warn!("Failed to remove scratch directory {}: {}", self.path.display(), e),
        }
    }
}
