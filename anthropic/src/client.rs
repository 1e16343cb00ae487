//! Anthropic API client implementation

use crate::{
    error::ClaudeError,
    messages::{MessagesRequest, MessagesResponse},
};
use reqwest::{Client, StatusCode};
use std::fmt;

/// Production Messages API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1";

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Non-standard status Anthropic returns when it is overloaded.
const STATUS_OVERLOADED: u16 = 529;

/// Anthropic API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl AnthropicClient {
    /// Create a new client with API key from environment
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::MissingApiKey` if `ANTHROPIC_API_KEY` is unset or blank
    pub fn from_env() -> Result<Self, ClaudeError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| ClaudeError::MissingApiKey)?;
        if api_key.trim().is_empty() {
            return Err(ClaudeError::MissingApiKey);
        }

        Ok(Self::new(api_key))
    }

    /// Create a new client with explicit API key
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Builder: Point the client at another base URL (proxies, tests)
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: Use a preconfigured `reqwest` client (timeouts, proxies)
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Create a message (non-streaming)
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, API errors, or parsing failures
    pub async fn messages(&self, request: MessagesRequest) -> Result<MessagesResponse, ClaudeError> {
        let response = self
            .client
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => response
                .json::<MessagesResponse>()
                .await
                .map_err(|e| ClaudeError::ResponseParseFailed(e.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(ClaudeError::RateLimited),
            StatusCode::UNAUTHORIZED => Err(ClaudeError::Unauthorized),
            status if status.as_u16() == STATUS_OVERLOADED => Err(ClaudeError::Overloaded),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ClaudeError::ApiError {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

impl fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
