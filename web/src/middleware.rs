//! Correlation ID middleware.
//!
//! Installed with `axum::middleware::from_fn(correlation_id)`. Each request
//! gets a [`CorrelationId`], taken from the `X-Correlation-ID` header when it
//! holds a valid UUID and generated otherwise. The ID is stored in request
//! extensions, attached to an `http_request` span, and echoed in the response.

use crate::extractors::CorrelationId;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Tag the request and its response with a correlation ID.
pub async fn correlation_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or_else(Uuid::new_v4);

    req.extensions_mut().insert(CorrelationId(id));

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    response
}
