//! Upload ingestion on ModuleManager.

use crate::archive::{ensure_allowed_archive, extract_zip, ScratchDir, UploadArtifact};
use crate::error::{ModdockError, Result};
use crate::naming::{derive_module_name, secure_name};
use crate::responses::UploadOutcome;
use crate::structure::detect_structure;
use crate::ModuleManager;
use tracing::{info, warn};

/// Stored name for uploads whose filename sanitizes to nothing.
const FALLBACK_UPLOAD_NAME: &str = "upload.zip";

impl ModuleManager {
    /// Ingest an uploaded archive as a module.
    ///
    /// The module is named `module_name` if given and non-empty, otherwise
    /// after `filename` without its extension. An existing module with the
    /// same name is replaced. Stages run strictly in order: persist,
    /// extract, detect, organize, write metadata. The persisted upload and
    /// the scratch directory are removed whether or not ingestion succeeds.
    pub async fn upload(
        &self,
        filename: &str,
        module_name: Option<&str>,
        data: &[u8],
    ) -> Result<UploadOutcome> {
        ensure_allowed_archive(filename)?;
        let name = derive_module_name(filename, module_name)?;

        let _guard = self.locks.lock(&name).await;
        match self.ingest(filename, &name, data).await {
            Ok(outcome) => {
                info!(
                    "Module {} uploaded as {} ({} files)",
                    name,
                    outcome.metadata.structure.module_type,
                    outcome.metadata.structure.files.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                warn!("Upload of {} as module {} failed: {}", filename, name, e);
                Err(e)
            }
        }
    }

    async fn ingest(&self, filename: &str, name: &str, data: &[u8]) -> Result<UploadOutcome> {
        let stored_name = match secure_name(filename) {
            secured if secured.is_empty() => FALLBACK_UPLOAD_NAME.to_string(),
            secured => secured,
        };

        let artifact = UploadArtifact::persist(&self.uploads_root, &stored_name, data)?;
        let scratch = ScratchDir::create(&self.uploads_root, name)?;

        let archive_path = artifact.path().to_path_buf();
        let scratch_path = scratch.path().to_path_buf();
        let structure = tokio::task::spawn_blocking(move || {
            extract_zip(&archive_path, &scratch_path)?;
            detect_structure(&scratch_path)
        })
        .await
        .map_err(|e| ModdockError::Other(format!("Extraction task failed: {}", e)))??;

        let registry = self.registry.clone();
        let module_name = name.to_string();
        let scratch_path = scratch.path().to_path_buf();
        let organized = tokio::task::spawn_blocking(move || {
            registry.organize(&module_name, &scratch_path)?;
            Ok::<_, ModdockError>(registry)
        })
        .await
        .map_err(|e| ModdockError::Other(format!("Organize task failed: {}", e)))?;
        let registry = organized?;
        scratch.release();

        let module_name = name.to_string();
        let metadata = tokio::task::spawn_blocking(move || {
            registry.write_metadata(&module_name, &structure)
        })
        .await
        .map_err(|e| ModdockError::Other(format!("Metadata task failed: {}", e)))??;
        drop(artifact);

        Ok(UploadOutcome {
            module_name: name.to_string(),
            metadata,
        })
    }
}
