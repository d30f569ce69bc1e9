//! Error handling for the stabilization service
//!
//! Pipeline sentinels (no hands, no motion, ...) are not errors and never
//! show up here; they are regular `FrameResponse` values.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Frame submission errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Request carried no image
    #[error("No image provided")]
    MissingImage,

    /// Image bytes could not be decoded
    #[error("Could not decode image: {0}")]
    InvalidImage(String),

    /// Extractor, classifier or worker failure. The session is left as it
    /// was before the frame.
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl FrameError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, FrameError::MissingImage | FrameError::InvalidImage(_))
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for FrameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if self.is_client_error() {
            tracing::warn!(status = %status, message = %message, "Rejected frame");
        } else {
            tracing::error!(status = %status, message = %message, "Frame processing failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
