//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{
        rejection::{BytesRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::HeaderMap,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::{self, PreviewJsonResponse, PreviewQuery};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::rendering::PreviewRenderer;
use crate::services::PreviewCache;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub renderer: Arc<PreviewRenderer>,
    pub previews: Arc<PreviewCache>,
}

/// Create application state from loaded configuration.
pub fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let renderer = PreviewRenderer::from_config(&config.preview)
        .map_err(|e| anyhow::anyhow!("Invalid preview configuration: {e}"))?;

    Ok(AppState {
        config: Arc::new(config),
        renderer: Arc::new(renderer),
        previews: Arc::new(PreviewCache::new()),
    })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.preview.max_body_bytes;

    Router::new()
        .route("/api/preview", post(handle_preview))
        .route("/api/preview/:hash", get(handle_preview_image))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<PreviewQuery>, QueryRejection>,
    body: Result<axum::body::Bytes, BytesRejection>,
) -> Result<Json<PreviewJsonResponse>, ApiError> {
    api::handle_preview(
        State(state.renderer),
        State(state.previews),
        headers,
        query,
        body,
    )
    .await
}

async fn handle_preview_image(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_preview_image(State(state.previews), path).await
}
