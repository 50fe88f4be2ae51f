//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`framestore_core::Error`] so that route
//! handlers can return `Result<T, AppError>` and every failure leaves the
//! server as a `{"success": false, "error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use framestore_core::Error;
use serde::{Deserialize, Serialize};

/// JSON body for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self { inner }
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self.inner {
            Error::NotFound { filename } => {
                tracing::warn!(status = %status, filename = %filename, "Image not found");
            }
            other => {
                tracing::error!(
                    status = %status,
                    kind = other.kind(),
                    error = %other,
                    "Request failed"
                );
            }
        }

        let body = ErrorResponse {
            success: false,
            error: self.inner.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
