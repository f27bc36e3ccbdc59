//! HTTP request handlers, split by domain.

mod modules;
mod store;
mod upload;

pub use modules::{handle_delete_module, handle_index, handle_view_module};
pub use store::{handle_store, handle_store_add, handle_store_remove};
pub use upload::handle_upload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moddock_core::{ModdockError, ModuleMetadata};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

// ============================================================================
// Shared response types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-facing outcome message, with the module's metadata on uploads.
#[derive(Debug, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleMetadata>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            module: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            module: None,
        }
    }

    pub fn with_module(mut self, metadata: ModuleMetadata) -> Self {
        self.module = Some(metadata);
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// A library error rendered as `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError(pub ModdockError);

impl From<ModdockError> for ApiError {
    fn from(err: ModdockError) -> Self {
        ApiError(err)
    }
}

pub(crate) fn status_for(err: &ModdockError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            ModdockError::ModuleNotFound { .. } => "Module not found".to_string(),
            other => other.to_string(),
        };

        if self.0.is_client_error() {
            debug!("Request rejected: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
