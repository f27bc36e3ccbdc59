//! Error types for moddock.
//!
//! Every failure the ingestion pipeline, the registry and the store can
//! produce is a variant of [`ModdockError`]. The HTTP layer maps variants to
//! status codes through [`ModdockError::status_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the moddock library.
#[derive(Debug, Error)]
pub enum ModdockError {
    // Upload and extraction errors
    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("Extraction failed: {message}")]
    ExtractionFailure { message: String },

    // Registry and store errors
    #[error("Module not found: {name}")]
    ModuleNotFound { name: String },

    #[error("Invalid module name: {name:?}")]
    InvalidModuleName { name: String },

    #[error("Corrupt store index at {}: {message}", .path.display())]
    CorruptIndex { path: PathBuf, message: String },

    #[error("Corrupt module metadata at {}: {message}", .path.display())]
    CorruptMetadata { path: PathBuf, message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for moddock operations.
pub type Result<T> = std::result::Result<T, ModdockError>;

impl From<std::io::Error> for ModdockError {
    fn from(err: std::io::Error) -> Self {
        ModdockError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ModdockError {
    fn from(err: serde_json::Error) -> Self {
        ModdockError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ModdockError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ModdockError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// HTTP status code the server answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ModdockError::UnsupportedFileType { .. } | ModdockError::InvalidModuleName { .. } => {
                400
            }
            ModdockError::ModuleNotFound { .. } => 404,
            ModdockError::ExtractionFailure { .. } => 422,
            _ => 500,
        }
    }

    /// True when the request, not the server's own state, is at fault.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
