//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation ID
//! - [`ChatPayload`]: a chat request body, JSON or form-encoded

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    Form, async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde::Deserialize;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Read from request extensions when the correlation middleware is installed,
/// otherwise from the `X-Correlation-ID` header, otherwise freshly generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Fields accepted by the chat endpoint.
///
/// Every field is optional on the wire: a missing `message` is answered with
/// the prompt-for-input reply, not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatRequest {
    /// Visitor's message.
    #[serde(default)]
    pub message: Option<String>,
    /// Caller-supplied session label.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Authenticated user reference.
    #[serde(default)]
    pub user_ref: Option<String>,
}

/// Chat request body, from `application/x-www-form-urlencoded` or JSON.
///
/// Any content type other than form-encoded is parsed as JSON. An empty body
/// is an empty request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPayload(pub ChatRequest);

#[async_trait]
impl<S> FromRequest<S> for ChatPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<ChatRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            return Ok(Self(body));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(ChatRequest::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {e}")))
    }
}
