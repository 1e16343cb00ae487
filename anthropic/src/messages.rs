//! Messages API request and response types

use crate::types::{ContentBlock, Message, Role, StopReason, Usage};
use serde::{Deserialize, Serialize};

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Request to create a message
#[derive(Clone, Debug, Serialize)]
pub struct MessagesRequest {
    /// Model to use
    pub model: String,
    /// Conversation so far; the chatbot sends a single user turn
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// System prompt (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Sampling temperature (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl MessagesRequest {
    /// Create a basic request with sensible defaults
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            messages,
            max_tokens: 1024,
            system: None,
            temperature: None,
        }
    }

    /// Builder: Set model
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Builder: Set max tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder: Set system prompt
    #[must_use]
    pub fn with_system(mut self, system: String) -> Self {
        self.system = Some(system);
        self
    }

    /// Builder: Set temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from creating a message
#[derive(Clone, Debug, Deserialize)]
pub struct MessagesResponse {
    /// Unique identifier for this message
    pub id: String,
    /// Model that generated the response
    pub model: String,
    /// Role (always "assistant" for responses)
    pub role: Role,
    /// Content blocks in the response
    pub content: Vec<ContentBlock>,
    /// Why the model stopped generating
    #[serde(default)]
    pub stop_reason: Option<StopReason>,
    /// Token usage statistics
    pub usage: Usage,
}

impl MessagesResponse {
    /// Concatenated text blocks, trimmed. Empty when there is no text.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<String>()
            .trim()
            .to_string()
    }
}
