//! Multipart upload handler.

use super::{status_for, Notice};
use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use moddock_core::ModdockError;
use std::sync::Arc;
use tracing::{debug, warn};

const FILE_FIELD: &str = "file";
const MODULE_NAME_FIELD: &str = "module_name";

struct UploadForm {
    file: Option<(String, Bytes)>,
    module_name: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, Response> {
    let mut form = UploadForm {
        file: None,
        module_name: None,
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload body: {}", e);
                return Err(Notice::error(e.body_text()).into_response_with(e.status()));
            }
        };

        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    warn!("Failed to read uploaded file: {}", e);
                    Notice::error(e.body_text()).into_response_with(e.status())
                })?;
                form.file = Some((filename, data));
            }
            Some(MODULE_NAME_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    Notice::error(e.body_text()).into_response_with(e.status())
                })?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    form.module_name = Some(trimmed.to_string());
                }
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

fn failure_message(err: &ModdockError) -> String {
    match err {
        ModdockError::UnsupportedFileType { .. } => {
            "Invalid file type. Only .zip files allowed.".to_string()
        }
        ModdockError::InvalidModuleName { name } => format!("Invalid module name: {:?}", name),
        other => format!("Error processing zip: {}", other),
    }
}

/// `POST /upload` - multipart `file` plus optional `module_name`.
pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some((filename, data)) = form.file else {
        return Notice::error("No file part").into_response_with(StatusCode::BAD_REQUEST);
    };
    if filename.is_empty() {
        return Notice::error("No selected file").into_response_with(StatusCode::BAD_REQUEST);
    }

    match state
        .manager
        .upload(&filename, form.module_name.as_deref(), &data)
        .await
    {
        Ok(outcome) => Notice::success(format!(
            "Module \"{}\" uploaded and organized successfully!",
            outcome.module_name
        ))
        .with_module(outcome.metadata)
        .into_response_with(StatusCode::OK),
        Err(e) => Notice::error(failure_message(&e)).into_response_with(status_for(&e)),
    }
}
