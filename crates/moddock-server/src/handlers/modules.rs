//! Registry handlers: listing, viewing and deleting modules.

use super::{ApiError, Notice};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use moddock_core::{ModuleDetails, ModuleListing};
use serde_json::{json, Value};
use std::sync::Arc;

/// `GET /` - registry modules with store membership and the store size.
pub async fn handle_index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModuleListing>, ApiError> {
    Ok(Json(state.manager.list_modules()?))
}

/// `GET /module/:name` - metadata and file tree.
pub async fn handle_view_module(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ModuleDetails>, ApiError> {
    Ok(Json(state.manager.view_module(&name)?))
}

/// `POST /module/delete/:name` - delete from the registry; absent is fine.
pub async fn handle_delete_module(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.manager.delete_module(&name).await?;

    let mut body = json!({ "success": true, "deleted": deleted });
    if deleted {
        let notice = Notice::success(format!("Module \"{}\" deleted!", name));
        body["level"] = json!(notice.level);
        body["message"] = json!(notice.message);
    }
    Ok(Json(body))
}
