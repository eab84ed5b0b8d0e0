//! Maps gateway errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use portier_auth::{AuthError, Rejection};

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication or authorization failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The login page could not be rendered.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e.rejection() {
                Rejection::Unauthorized => StatusCode::UNAUTHORIZED,
                Rejection::Forbidden => StatusCode::FORBIDDEN,
                Rejection::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Task(_) | ApiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match status {
            StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "authentication required"),
            StatusCode::FORBIDDEN => ("FORBIDDEN", "access denied"),
            StatusCode::SERVICE_UNAVAILABLE => {
                tracing::error!(error = %self, "Authentication backend unavailable");
                ("SERVICE_UNAVAILABLE", "service unavailable")
            },
            _ => {
                tracing::error!(error = %self, "Internal server error");
                ("INTERNAL_ERROR", "internal error")
            },
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: message.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
