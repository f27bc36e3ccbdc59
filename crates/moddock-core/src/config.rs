//! Centralized configuration constants for moddock.

/// Directory and file names under the data root.
pub struct PathsConfig;

impl PathsConfig {
    pub const UPLOADS_DIR_NAME: &'static str = "uploads";
    pub const MODULES_DIR_NAME: &'static str = "modules";
    pub const STORE_DIR_NAME: &'static str = "store";
    /// Store index document, relative to the store root.
    pub const STORE_INDEX_FILENAME: &'static str = "index.json";
    /// Advisory lock file guarding the store index.
    pub const STORE_INDEX_LOCK_FILENAME: &'static str = "index.json.lock";
    /// Reserved metadata file written into every module directory.
    pub const METADATA_FILENAME: &'static str = ".module_metadata.json";
    /// Prefix of the scratch directory an upload is extracted into.
    pub const SCRATCH_DIR_PREFIX: &'static str = "extracted_";
}

/// Upload validation limits.
pub struct UploadConfig;

impl UploadConfig {
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] = &["zip"];
    pub const MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024; // 500MB
    pub const MAX_NAME_LENGTH: usize = 128;
}
