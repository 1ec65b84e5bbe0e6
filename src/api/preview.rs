use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stitch_grid::PatternStats;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::{GenerationResponse, PatternPreview};
use crate::rendering::{Legend, LegendChip, PreviewRenderer};
use crate::services::PreviewCache;

/// Accepted range for the `target` query parameter
pub const MIN_TARGET: u32 = 16;
pub const MAX_TARGET: u32 = 4096;

/// Error body returned by the preview endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Error message
    pub error: String,
}

/// Query parameters for preview rendering
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    /// Length of the longer side in pixels (16-4096)
    #[serde(default)]
    pub target: Option<u32>,
}

/// Pattern statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewStatsBody {
    pub rows: usize,
    pub cols: usize,
    pub total_stitches: usize,
    /// Number of palette entries
    pub distinct_colors: usize,
    /// Cells without a thread reference
    pub unthreaded: usize,
}

impl From<&PatternStats> for PreviewStatsBody {
    fn from(stats: &PatternStats) -> Self {
        Self {
            rows: stats.rows,
            cols: stats.cols,
            total_stitches: stats.total_stitches,
            distinct_colors: stats.distinct_colors,
            unthreaded: stats.unthreaded(),
        }
    }
}

/// Palette consistency findings
#[derive(Debug, Serialize, ToSchema)]
pub struct PaletteAuditBody {
    /// Palette entries no cell uses
    pub unreferenced: Vec<String>,
    /// Thread ids used by cells but missing from the palette
    pub dangling: Vec<String>,
}

/// Response from `POST /api/preview`
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewJsonResponse {
    /// Image identifier, `<sha256>.png`
    pub filename: String,
    /// Absolute URL of the rendered PNG
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub cell_size: f32,
    pub stats: PreviewStatsBody,
    pub legend: Vec<LegendChip>,
    pub palette_audit: PaletteAuditBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_colors: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
}

/// Render a generation response as a preview
///
/// Validates the pattern, renders it, and stores the PNG for later
/// retrieval from `image_url`.
#[utoipa::path(
    post,
    path = "/api/preview",
    request_body(content = GenerationResponse, description = "Response from the pattern generation server"),
    responses(
        (status = 200, description = "Preview rendered", body = PreviewJsonResponse),
        (status = 400, description = "Invalid target", body = PreviewErrorResponse),
        (status = 413, description = "Body larger than preview.max_body_bytes", body = PreviewErrorResponse),
        (status = 422, description = "Rejected, malformed or invalid pattern", body = PreviewErrorResponse),
        (status = 500, description = "Rendering error", body = PreviewErrorResponse),
    ),
    params(PreviewQuery),
    tag = "Preview"
)]
pub async fn handle_preview(
    State(renderer): State<Arc<PreviewRenderer>>,
    State(cache): State<Arc<PreviewCache>>,
    headers: HeaderMap,
    query: Result<Query<PreviewQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PreviewJsonResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let body = body.map_err(|e| {
        tracing::warn!(status = %e.status(), error = %e.body_text(), "Preview body rejected");
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::BadRequest(e.body_text())
        }
    })?;

    let target = match query.target {
        Some(t) if (MIN_TARGET..=MAX_TARGET).contains(&t) => Some(t as f32),
        Some(t) => {
            return Err(ApiError::BadRequest(format!(
                "target must be between {MIN_TARGET} and {MAX_TARGET}, got {t}"
            )))
        }
        None => None,
    };

    let preview = GenerationResponse::from_slice(&body)?.into_preview()?;
    let PatternPreview {
        pattern,
        palette,
        audit,
        canvas_size,
        mesh_count,
        max_colors,
        source_image,
        ..
    } = preview;

    tracing::info!(
        rows = pattern.row_count(),
        cols = pattern.col_count(),
        colors = palette.len(),
        requested_target = ?target,
        "Preview request received"
    );

    // Rasterizing and PNG encoding are CPU-bound
    let (rendered, legend) = tokio::task::spawn_blocking(move || {
        renderer.render_png(&pattern, &palette, target).map(|rendered| {
            let legend = Legend::build(&palette, &rendered.stats);
            (rendered, legend)
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task error: {e}")))??;

    let width = rendered.layout.pixel_width();
    let height = rendered.layout.pixel_height();
    let size_bytes = rendered.png.len();
    let hash = cache.store(rendered.png).await;

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:3000");
    let image_url = format!("http://{host}/api/preview/{hash}.png");

    tracing::info!(hash = %hash, width, height, size_bytes, "Preview rendered");

    Ok(Json(PreviewJsonResponse {
        filename: format!("{hash}.png"),
        image_url,
        width,
        height,
        cell_size: rendered.layout.cell_size,
        stats: PreviewStatsBody::from(&rendered.stats),
        legend: legend.chips().to_vec(),
        palette_audit: PaletteAuditBody {
            unreferenced: audit.unreferenced,
            dangling: audit.dangling,
        },
        canvas_size,
        mesh_count,
        max_colors,
        source_image,
    }))
}

/// Get a rendered preview PNG
#[utoipa::path(
    get,
    path = "/api/preview/{hash}",
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 404, description = "Unknown or evicted preview", body = PreviewErrorResponse),
    ),
    params(
        ("hash" = String, Path, description = "Preview hash, optionally with a .png suffix"),
    ),
    tag = "Preview"
)]
pub async fn handle_preview_image(
    State(cache): State<Arc<PreviewCache>>,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    let key = hash.strip_suffix(".png").unwrap_or(&hash);
    let cached = cache.get(key).await.ok_or_else(|| {
        tracing::debug!(hash = %key, "Preview not in cache");
        ApiError::NotFound
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_LENGTH, cached.png_bytes.len().to_string()),
            (
                header::LAST_MODIFIED,
                cached
                    .generated_at
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            ),
        ],
        Bytes::from(cached.png_bytes),
    )
        .into_response())
}
