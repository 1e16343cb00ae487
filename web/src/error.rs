//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. Error bodies share
//! the chat endpoint's envelope:
//!
//! ```json
//! { "status": "error", "message": "...", "code": "BAD_REQUEST" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dudu_hub_core::catalog::CatalogError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (logged, never sent to the client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_SERVER_ERROR")
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Always `"error"`.
    status: &'static str,
    /// Human-readable error message.
    message: String,
    /// Error code (for client error handling).
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Request failed"
                ),
            }
        } else {
            tracing::debug!(status = %self.status, code = self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            status: "error",
            message: self.message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::unavailable("Catalog is temporarily unavailable").with_source(err.into())
    }
}
