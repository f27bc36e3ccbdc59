//! HTTP server implementation using Axum.

use crate::handlers::{
    handle_delete_module, handle_health, handle_index, handle_store, handle_store_add,
    handle_store_remove, handle_upload, handle_view_module,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use moddock_core::ModuleManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub manager: ModuleManager,
}

/// Build the router with every route and middleware layer.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/", get(handle_index))
        .route("/upload", post(handle_upload))
        .route("/module/:name", get(handle_view_module))
        .route("/module/delete/:name", post(handle_delete_module))
        .route("/store", get(handle_store))
        .route("/store/add/:name", post(handle_store_add))
        .route("/store/remove/:name", post(handle_store_remove))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    manager: ModuleManager,
    host: &str,
    port: u16,
    max_upload_bytes: usize,
) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState { manager });
    let app = build_router(state, max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
