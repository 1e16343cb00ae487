//! External AI completion with explicit fallback.
//!
//! The orchestrator never handles a provider error directly. Every call goes
//! through [`request_completion`], which turns the provider's result into a
//! [`CompletionOutcome`]: either the provider's text, or a
//! [`FallbackReason`] telling the orchestrator to answer locally.
//!
//! Authentication, quota, rate limiting, transport failures, malformed or
//! empty responses and timeouts are all treated the same way.

use crate::BoxFuture;
use crate::catalog::CatalogSnapshot;
use crate::knowledge::KnowledgeEntry;
use dudu_hub_anthropic::{AnthropicClient, ClaudeError, Message, MessagesRequest};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Support number visitors are pointed to when the bot does not know.
pub const SUPPORT_PHONE: &str = "+919940764517";

/// What the provider is asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instructions, including grounding text.
    pub system: String,
    /// The visitor's message.
    pub message: String,
}

/// Errors reported by a completion provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Credentials were rejected.
    #[error("Provider rejected credentials")]
    Unauthorized,

    /// Quota exhausted or too many requests.
    #[error("Provider rate limited or out of quota")]
    RateLimited,

    /// The request never completed.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The provider answered with something unusable.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// The provider returned an error status.
    #[error("Provider error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body
        message: String,
    },
}

/// Why the local matcher is answering instead of the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The provider did not answer within the configured timeout.
    Timeout(Duration),
    /// The provider answered with blank text.
    EmptyResponse,
    /// The provider failed.
    Provider(CompletionError),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
            Self::EmptyResponse => f.write_str("empty response"),
            Self::Provider(e) => write!(f, "{e}"),
        }
    }
}

/// Result of attempting an external completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The provider produced a usable reply.
    Matched(String),
    /// Answer locally instead.
    Fallback(FallbackReason),
}

/// External AI completion provider.
pub trait CompletionProvider: Send + Sync {
    /// Produce free text for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError`] for any provider or transport failure.
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, CompletionError>>;
}

/// Call `provider`, bounded by `timeout`, and classify the result.
pub async fn request_completion(
    provider: &dyn CompletionProvider,
    request: CompletionRequest,
    timeout: Duration,
) -> CompletionOutcome {
    match tokio::time::timeout(timeout, provider.complete(request)).await {
        Err(_) => CompletionOutcome::Fallback(FallbackReason::Timeout(timeout)),
        Ok(Err(e)) => CompletionOutcome::Fallback(FallbackReason::Provider(e)),
        Ok(Ok(text)) => {
            let text = text.trim();
            if text.is_empty() {
                CompletionOutcome::Fallback(FallbackReason::EmptyResponse)
            } else {
                CompletionOutcome::Matched(text.to_string())
            }
        }
    }
}

/// Build the system instructions for the external provider.
///
/// `grounding` is the ranked subset of knowledge entries most relevant to the
/// current message.
#[must_use]
pub fn build_system_prompt(catalog: &CatalogSnapshot, grounding: &[&KnowledgeEntry]) -> String {
    let mut prompt = String::from(
        "You are 'Panda Bot' 🐼, the friendly AI assistant for DUDU Industrial Visit Hub.\n\n\
         Personality: Energetic, helpful, professional yet warm. Use emojis sparingly but effectively.\n\n",
    );

    prompt.push_str(&format!(
        "Available Locations: {}\n",
        catalog.locations().join(", ")
    ));
    prompt.push_str(&catalog.grounding_text());

    if !grounding.is_empty() {
        prompt.push_str("\nFrequently asked questions:\n");
        for entry in grounding {
            prompt.push_str(&format!("Q: {}\nA: {}\n", entry.question, entry.answer));
        }
    }

    prompt.push_str(&format!(
        "\nGuidelines:\n\
         1. Provide specific information about our industrial visits\n\
         2. Mention exact locations, prices, and durations when asked\n\
         3. Direct users to the 'Industrial's' page for booking\n\
         4. Keep responses concise (2-4 sentences max)\n\
         5. Be encouraging and enthusiastic about industrial learning!\n\
         6. If you don't know something, admit it and suggest contacting {SUPPORT_PHONE}\n"
    ));

    prompt
}

/// [`CompletionProvider`] backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicCompletion {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicCompletion {
    /// Short replies: the chat widget shows a few sentences at most.
    pub const DEFAULT_MAX_TOKENS: u32 = 250;

    /// Create a provider using `model`.
    #[must_use]
    pub const fn new(client: AnthropicClient, model: String) -> Self {
        Self {
            client,
            model,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: 0.8,
        }
    }
}

impl fmt::Debug for AnthropicCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicCompletion")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl From<ClaudeError> for CompletionError {
    fn from(err: ClaudeError) -> Self {
        match err {
            ClaudeError::MissingApiKey | ClaudeError::Unauthorized => Self::Unauthorized,
            ClaudeError::RateLimited | ClaudeError::Overloaded => Self::RateLimited,
            ClaudeError::RequestFailed(msg) => Self::Transport(msg),
            ClaudeError::Timeout => Self::Transport("request timed out".to_string()),
            ClaudeError::ResponseParseFailed(msg) => Self::Malformed(msg),
            ClaudeError::ApiError { status, message } => Self::Api { status, message },
        }
    }
}

impl CompletionProvider for AnthropicCompletion {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, CompletionError>> {
        Box::pin(async move {
            let messages_request = MessagesRequest::new(vec![Message::user(request.message)])
                .with_model(self.model.clone())
                .with_max_tokens(self.max_tokens)
                .with_temperature(self.temperature)
                .with_system(request.system);

            let response = self.client.messages(messages_request).await?;

            tracing::debug!(
                model = %response.model,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Completion received"
            );

            Ok(response.text())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Offering;

    struct Fixed(Result<String, CompletionError>);

    impl CompletionProvider for Fixed {
        fn complete(&self, _request: CompletionRequest) -> BoxFuture<'_, Result<String, CompletionError>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    struct Slow;

    impl CompletionProvider for Slow {
        fn complete(&self, _request: CompletionRequest) -> BoxFuture<'_, Result<String, CompletionError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("too late".to_string())
            })
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            message: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_is_matched_and_trimmed() {
        let outcome = request_completion(
            &Fixed(Ok("  Hi there!  ".to_string())),
            request(),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(outcome, CompletionOutcome::Matched("Hi there!".to_string()));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let outcome = request_completion(
            &Fixed(Err(CompletionError::RateLimited)),
            request(),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(
            outcome,
            CompletionOutcome::Fallback(FallbackReason::Provider(CompletionError::RateLimited))
        );
    }

    #[tokio::test]
    async fn test_blank_text_falls_back() {
        let outcome =
            request_completion(&Fixed(Ok("   ".to_string())), request(), Duration::from_secs(1))
                .await;
        assert_eq!(outcome, CompletionOutcome::Fallback(FallbackReason::EmptyResponse));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let limit = Duration::from_millis(500);
        let outcome = request_completion(&Slow, request(), limit).await;
        assert_eq!(outcome, CompletionOutcome::Fallback(FallbackReason::Timeout(limit)));
    }

    #[test]
    fn test_claude_errors_map_to_completion_errors() {
        assert_eq!(CompletionError::from(ClaudeError::Unauthorized), CompletionError::Unauthorized);
        assert_eq!(CompletionError::from(ClaudeError::MissingApiKey), CompletionError::Unauthorized);
        assert_eq!(CompletionError::from(ClaudeError::RateLimited), CompletionError::RateLimited);
        assert_eq!(CompletionError::from(ClaudeError::Overloaded), CompletionError::RateLimited);
        assert_eq!(
            CompletionError::from(ClaudeError::ApiError {
                status: 529,
                message: "overloaded".to_string()
            }),
            CompletionError::Api {
                status: 529,
                message: "overloaded".to_string()
            }
        );
    }

    #[test]
    fn test_system_prompt_includes_catalog_and_grounding() {
        let catalog = CatalogSnapshot::new(vec![Offering {
            id: 1,
            title: "Steel Plant Visit".to_string(),
            location: "Chennai".to_string(),
            price: 2000.0,
            duration: "1 Day".to_string(),
            description: "Guided tour of the rolling mill".to_string(),
        }]);
        let faq = KnowledgeEntry::new("how to book", "Step 1...");

        let prompt = build_system_prompt(&catalog, &[&faq]);

        assert!(prompt.contains("Panda Bot"));
        assert!(prompt.contains("Available Locations: Chennai"));
        assert!(prompt.contains("- Steel Plant Visit in Chennai: ₹2000, 1 Day"));
        assert!(prompt.contains("Q: how to book\nA: Step 1..."));
        assert!(prompt.contains(SUPPORT_PHONE));
    }

    #[test]
    fn test_fallback_reason_display() {
        assert_eq!(
            FallbackReason::Timeout(Duration::from_millis(1500)).to_string(),
            "timed out after 1500ms"
        );
        assert_eq!(FallbackReason::EmptyResponse.to_string(), "empty response");
    }
}
