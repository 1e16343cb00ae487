//! Error types for the Anthropic API client

use thiserror::Error;

/// Errors that can occur when calling the Messages API
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// Missing `ANTHROPIC_API_KEY` environment variable
    #[error("Missing ANTHROPIC_API_KEY environment variable")]
    MissingApiKey,

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The HTTP client gave up waiting
    #[error("Request timed out")]
    Timeout,

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Rate limited - too many requests (429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// API temporarily overloaded (529)
    #[error("API overloaded")]
    Overloaded,

    /// Unauthorized - invalid API key (401)
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// API returned any other error status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error body from API
        message: String,
    },
}

impl From<reqwest::Error> for ClaudeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
