//! Zip extraction into a scratch directory.

use crate::{ModdockError, Result};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Unpack every entry of the zip archive at `archive_path` into `extract_dir`.
///
/// The whole extraction fails if any entry would land outside
/// `extract_dir` (absolute paths, `..` components). Returns the number of
/// files written.
pub fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<usize> {
    info!(
        "Extracting {} to {}",
        archive_path.display(),
        extract_dir.display()
    );

    let file = File::open(archive_path).map_err(|e| ModdockError::io_with_path(e, archive_path))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| ModdockError::ExtractionFailure {
        message: format!("Invalid zip archive: {}", e),
    })?;

    std::fs::create_dir_all(extract_dir).map_err(|e| ModdockError::io_with_path(e, extract_dir))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ModdockError::ExtractionFailure {
                message: format!("Failed to read zip entry {}: {}", i, e),
            })?;

        let outpath = match entry.enclosed_name() {
            Some(path) => extract_dir.join(path),
            None => {
                return Err(ModdockError::ExtractionFailure {
                    message: format!("Archive entry escapes extraction directory: {}", entry.name()),
                });
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| ModdockError::io_with_path(e, &outpath))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModdockError::io_with_path(e, parent))?;
        }

        let mut outfile =
            File::create(&outpath).map_err(|e| ModdockError::io_with_path(e, &outpath))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| ModdockError::ExtractionFailure {
            message: format!("Failed to extract {}: {}", entry.name(), e),
        })?;
        written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode & 0o777))
                    .ok();
            }
        }
    }

    debug!("Extracted {} files from {}", written, archive_path.display());
    Ok(written)
}
