//! Request-level error taxonomy, mapped to HTTP responses.
//!
//! Validation failures are detected at the boundary and surfaced as
//! client-visible 4xx errors; they never propagate into decision logic.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use courier_common::{ErrorResponse, MalformedVersion};

/// Errors surfaced to clients by the negotiation and download endpoints
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    MalformedVersion(#[from] MalformedVersion),

    #[error("invalid artifact filename: {0:?}")]
    InvalidFilename(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("artifact store I/O failure: {0}")]
    Io(std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedVersion(_) | ApiError::InvalidFilename(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ArtifactNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
