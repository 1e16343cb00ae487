//! Chat endpoint.

use crate::extractors::{ChatPayload, CorrelationId};
use crate::state::AppState;
use axum::{Json, extract::State};
use dudu_hub_core::conversation::{SessionId, UserRef};
use serde::{Deserialize, Serialize};

/// Successful chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Always `"success"`.
    pub status: String,
    /// Reply text.
    pub response: String,
    /// Session the message was logged under; generated when absent.
    pub session_id: String,
}

/// Answer one visitor message.
///
/// # Endpoint
///
/// ```text
/// POST /api/chat/
/// ```
///
/// # Request
///
/// JSON or form-encoded:
///
/// ```json
/// { "message": "How do I book a visit?", "session_id": "optional", "user_ref": "optional" }
/// ```
///
/// # Response
///
/// ```json
/// { "status": "success", "response": "Step 1...", "session_id": "..." }
/// ```
///
/// A missing or blank `message` is answered with the prompt-for-input reply.
/// A missing `session_id` is replaced by a fresh UUID, echoed back but not
/// remembered.
pub async fn chat(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ChatPayload(request): ChatPayload,
) -> Json<ChatResponse> {
    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .map_or_else(SessionId::generate, SessionId::new);
    let user_ref = request
        .user_ref
        .filter(|u| !u.trim().is_empty())
        .map(UserRef::new);
    let message = request.message.unwrap_or_default();

    tracing::debug!(
        correlation_id = %correlation_id.0,
        session_id = %session_id,
        message_chars = message.chars().count(),
        "Chat message received"
    );

    let response = state
        .orchestrator
        .answer(&message, user_ref.as_ref(), &session_id)
        .await;

    Json(ChatResponse {
        status: "success".to_string(),
        response,
        session_id: session_id.to_string(),
    })
}
