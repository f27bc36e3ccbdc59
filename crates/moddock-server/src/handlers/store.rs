//! Store handlers: listing, promotion and demotion.

use super::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// `GET /store` - every store entry in index order.
pub async fn handle_store(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let modules = state.manager.store_entries()?;
    Ok(Json(json!({ "modules": modules })))
}

/// `POST /store/add/:name` - promote a registry module.
pub async fn handle_store_add(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.manager.add_to_store(&name).await?;
    info!("Module \"{}\" added to store", name);
    Ok(Json(json!({ "success": true })))
}

/// `POST /store/remove/:name` - demote; succeeds for absent names.
pub async fn handle_store_remove(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.manager.remove_from_store(&name).await?;
    info!("Module \"{}\" removed from store", name);
    Ok(Json(json!({ "success": true })))
}
