//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// `ok`, `ready` or `unavailable`.
    pub status: &'static str,
    /// Failure detail, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness: the process is up. Does NOT check dependencies.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            message: None,
        }),
    )
}

/// Readiness: the catalog can be read.
///
/// ```text
/// GET /health/ready
/// ```
///
/// - 200 OK: catalog reachable
/// - 503 Service Unavailable: catalog read failed
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.catalog.list_active().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready",
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    message: Some("Catalog is temporarily unavailable".to_string()),
                }),
            )
        }
    }
}
