use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stitch_grid::PatternError;
use thiserror::Error;

use crate::models::ResponseError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Malformed(String),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ResponseError> for ApiError {
    fn from(e: ResponseError) -> Self {
        match e {
            ResponseError::Rejected(message) => ApiError::Rejected(message),
            ResponseError::Malformed(_) => ApiError::Malformed(e.to_string()),
            ResponseError::InvalidPattern(e) => ApiError::Render(RenderError::InvalidPattern(e)),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    #[error("Failed to allocate {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },

    #[error("Nothing has been rendered yet")]
    EmptySurface,

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Rejected(_) | ApiError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Render(RenderError::InvalidPattern(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
