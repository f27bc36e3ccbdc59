//! Directory helpers shared by the registry and the store.
//!
//! Replacing a live directory is done as a staged swap: the new contents are
//! fully prepared in a hidden sibling, then exchanged with the live directory
//! in one rename where the platform supports it (Linux `RENAME_EXCHANGE`).
//! Elsewhere the old directory is renamed aside before the prepared one is
//! renamed into place. The old contents are deleted last.

use crate::{ModdockError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Hidden sibling directory name inside `root` for staging work on `name`.
pub(crate) fn hidden_sibling(root: &Path, tag: &str, name: &str) -> PathBuf {
    root.join(format!(".{}-{}-{}", tag, name, uuid::Uuid::new_v4().simple()))
}

/// Directory entries starting with `.` are staging/trash areas, never modules.
pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Remove `path` recursively. Returns `false` if it did not exist.
pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ModdockError::io_with_path(e, path)),
    }
}

/// Copy the directory tree at `src` into `dest`, creating `dest`.
///
/// Only directories and regular files are copied. Returns the number of
/// files copied.
pub(crate) fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<u64> {
    fs::create_dir_all(dest).map_err(|e| ModdockError::io_with_path(e, dest))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| ModdockError::Io {
            message: format!("Failed to walk {}: {}", src.display(), e),
            path: e.path().map(|p| p.to_path_buf()),
            source: None,
        })?;

        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| ModdockError::io_with_path(e, &target))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ModdockError::io_with_path(e, parent))?;
            }
            fs::copy(entry.path(), &target)
                .map_err(|e| ModdockError::io_with_path(e, &target))?;
            copied += 1;
        } else {
            debug!("Skipping non-regular entry {}", entry.path().display());
        }
    }

    Ok(copied)
}

/// Move a directory, falling back to copy + delete when a rename is not
/// possible (for example across filesystems).
pub(crate) fn move_dir(src: &Path, dest: &Path) -> Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }

    debug!(
        "Rename {} -> {} failed, copying instead",
        src.display(),
        dest.display()
    );
    if let Err(e) = copy_dir_recursive(src, dest) {
        let _ = remove_dir_if_exists(dest);
        return Err(e);
    }
    remove_dir_if_exists(src)?;
    Ok(())
}

/// Replace `target` with the already prepared directory `staged`.
///
/// `staged` must live in the same directory as `target`, so both renames
/// stay on one filesystem. Where the platform can exchange two paths
/// atomically, `target` never disappears; otherwise it is absent between
/// the two renames below.
pub(crate) fn swap_into_place(staged: &Path, target: &Path) -> Result<()> {
    let root = target.parent().ok_or_else(|| {
        ModdockError::Other(format!("{} has no parent directory", target.display()))
    })?;
    if target.exists() && exchange_dirs(staged, target) {
        // `staged` now holds the replaced contents.
        if let Err(e) = remove_dir_if_exists(staged) {
            warn!("Failed to remove replaced directory {}: {}", staged.display(), e);
        }
        return Ok(());
    }

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let trash = if target.exists() {
        let trash = hidden_sibling(root, "trash", &name);
        fs::rename(target, &trash).map_err(|e| ModdockError::io_with_path(e, target))?;
        Some(trash)
    } else {
        None
    };

    if let Err(e) = fs::rename(staged, target) {
        if let Some(trash) = &trash {
            if let Err(restore) = fs::rename(trash, target) {
                warn!(
                    "Failed to restore {} after aborted swap: {}",
                    target.display(),
                    restore
                );
            }
        }
        return Err(ModdockError::io_with_path(e, target));
    }

    if let Some(trash) = trash {
        if let Err(e) = remove_dir_if_exists(&trash) {
            warn!("Failed to remove replaced directory {}: {}", trash.display(), e);
        }
    }

    Ok(())
}

/// Atomically exchange two existing directories. Returns `false` when the
/// platform or filesystem cannot, leaving both untouched.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn exchange_dirs(a: &Path, b: &Path) -> bool {
    use nix::fcntl::{renameat2, RenameFlags};

    match renameat2(None, a, None, b, RenameFlags::RENAME_EXCHANGE) {
        Ok(()) => true,
        Err(e) => {
            debug!("Atomic exchange into {} unavailable: {}", b.display(), e);
            false
        }
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn exchange_dirs(_a: &Path, _b: &Path) -> bool {
    false
}
