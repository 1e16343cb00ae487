//! Axum HTTP surface for the DUDU Industrial Visit Hub chatbot.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/api/chat/`, `/api/chat` | [`handlers::chat::chat`] |
//! | `GET` | `/api/industrials/`, `/api/industrials` | [`handlers::catalog::list_industrials`] |
//! | `GET` | `/health` | [`handlers::health::health_check`] |
//! | `GET` | `/health/ready` | [`handlers::health::readiness_check`] |
//!
//! Every response carries an `X-Correlation-ID` header (see [`middleware`]).
//!
//! # Example
//!
//! ```ignore
//! use dudu_hub_web::{AppState, router};
//!
//! let app = router(AppState::new(orchestrator, catalog));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ChatPayload, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id};
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/", post(handlers::chat::chat))
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/industrials/", get(handlers::catalog::list_industrials))
        .route("/api/industrials", get(handlers::catalog::list_industrials))
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(correlation_id))
}
