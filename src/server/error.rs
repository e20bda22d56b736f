//! API error responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sensorlink_core::CommandError;
use serde_json::json;
use thiserror::Error;

/// Errors a handler can return, rendered as `{"error": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or lacking a required field
    #[error("{0}")]
    BadRequest(String),

    /// Event failed validation before reaching the wire
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Background serial task failed
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Command(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
