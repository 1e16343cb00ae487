//! Response orchestrator: the single entry point for a chat message.
//!
//! # Flow
//!
//! ```text
//! message ──► empty? ──► prompt (not logged)
//!                │
//!                ▼
//!          catalog read ──► failed ──► apology ────────────────┐
//!                │                                             │
//!                ▼                                             │
//!          knowledge read (failure = empty)                    │
//!                │                                             │
//!      assisted? ├──► provider ──► Matched ──► reply ──────────┤
//!                │        └──► Fallback ──┐                    │
//!                ▼                        ▼                    │
//!          matcher ──► intents ──► default reply ──────────────┤
//!                                                              ▼
//!                                               conversation log (errors swallowed)
//! ```
//!
//! [`ResponseOrchestrator::answer`] always returns non-empty text and never
//! returns an error.

use crate::catalog::{CatalogSnapshot, CatalogSource};
use crate::completion::{
    CompletionOutcome, CompletionProvider, CompletionRequest, build_system_prompt,
    request_completion,
};
use crate::config::{ChatbotConfig, ResponseMode};
use crate::conversation::{ConversationLogger, SessionId, UserRef};
use crate::intents::Intent;
use crate::knowledge::{KnowledgeEntry, KnowledgeStore};
use crate::matcher::QueryMatcher;
use std::fmt;
use std::sync::Arc;

/// Which path produced a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponsePath {
    /// Empty message; the visitor was asked to type something.
    Prompt,
    /// Catalog unavailable.
    Apology,
    /// External completion provider.
    Completion,
    /// Knowledge entry from the matcher.
    Matcher,
    /// Catalog-driven intent.
    Intent,
    /// Nothing applied.
    Default,
}

impl ResponsePath {
    /// Label used in logs and the `chatbot.responses` metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Apology => "apology",
            Self::Completion => "completion",
            Self::Matcher => "matcher",
            Self::Intent => "intent",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply together with the path that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text. Never empty.
    pub text: String,
    /// Path taken.
    pub path: ResponsePath,
}

impl ChatReply {
    fn new(text: impl Into<String>, path: ResponsePath) -> Self {
        Self {
            text: text.into(),
            path,
        }
    }
}

/// Chooses between external completion and local matching, then logs.
#[derive(Clone)]
pub struct ResponseOrchestrator {
    config: ChatbotConfig,
    matcher: QueryMatcher,
    knowledge: Arc<dyn KnowledgeStore>,
    catalog: Arc<dyn CatalogSource>,
    logger: ConversationLogger,
    completion: Option<Arc<dyn CompletionProvider>>,
}

impl ResponseOrchestrator {
    /// Create an orchestrator without an external provider.
    ///
    /// Until [`with_completion_provider`](Self::with_completion_provider) is
    /// called, [`ResponseMode::Assisted`] behaves like local mode.
    #[must_use]
    pub fn new(
        config: ChatbotConfig,
        knowledge: Arc<dyn KnowledgeStore>,
        catalog: Arc<dyn CatalogSource>,
        logger: ConversationLogger,
    ) -> Self {
        let matcher = QueryMatcher::new(config.weights, config.stopwords.clone());
        Self {
            config,
            matcher,
            knowledge,
            catalog,
            logger,
            completion: None,
        }
    }

    /// Attach the external completion provider.
    #[must_use]
    pub fn with_completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(provider);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ChatbotConfig {
        &self.config
    }

    /// Conversation logger in use.
    #[must_use]
    pub const fn logger(&self) -> &ConversationLogger {
        &self.logger
    }

    /// Reply text for `message`. Never empty, never an error.
    pub async fn answer(
        &self,
        message: &str,
        user_ref: Option<&UserRef>,
        session_id: &SessionId,
    ) -> String {
        self.respond(message, user_ref, session_id).await.text
    }

    /// Like [`answer`](Self::answer), also reporting the path taken.
    #[tracing::instrument(skip(self, message, user_ref), fields(session_id = %session_id), name = "chatbot_respond")]
    pub async fn respond(
        &self,
        message: &str,
        user_ref: Option<&UserRef>,
        session_id: &SessionId,
    ) -> ChatReply {
        if message.trim().is_empty() {
            let reply = ChatReply::new(self.config.replies.prompt.clone(), ResponsePath::Prompt);
            record_reply(&reply);
            return reply;
        }

        let reply = match self.catalog.list_active().await {
            Ok(offerings) => {
                let catalog = CatalogSnapshot::new(offerings);
                let entries = self.load_knowledge().await;
                let reply = self.reply_with_context(message, &catalog, &entries).await;

                // A blank stored answer or provider reply must never reach the visitor
                if reply.text.trim().is_empty() {
                    self.default_reply(&catalog)
                } else {
                    reply
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog unavailable, replying with apology");
                ChatReply::new(self.config.replies.apology.clone(), ResponsePath::Apology)
            }
        };

        record_reply(&reply);

        if let Err(e) = self
            .logger
            .log(session_id, user_ref, message, &reply.text)
            .await
        {
            metrics::counter!("chatbot.log_write_failures").increment(1);
            tracing::warn!(error = %e, "Failed to write conversation log");
        }

        reply
    }

    async fn load_knowledge(&self) -> Vec<KnowledgeEntry> {
        match self.knowledge.load_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge store unavailable, matching against no entries");
                Vec::new()
            }
        }
    }

    async fn reply_with_context(
        &self,
        message: &str,
        catalog: &CatalogSnapshot,
        entries: &[KnowledgeEntry],
    ) -> ChatReply {
        if self.config.mode == ResponseMode::Assisted {
            if let Some(provider) = &self.completion {
                let grounding: Vec<&KnowledgeEntry> = self
                    .matcher
                    .rank(message, entries, self.config.grounding_limit)
                    .into_iter()
                    .map(|scored| scored.entry)
                    .collect();

                let request = CompletionRequest {
                    system: build_system_prompt(catalog, &grounding),
                    message: message.to_string(),
                };

                match request_completion(provider.as_ref(), request, self.config.completion_timeout)
                    .await
                {
                    CompletionOutcome::Matched(text) => {
                        return ChatReply::new(text, ResponsePath::Completion);
                    }
                    CompletionOutcome::Fallback(reason) => {
                        tracing::warn!(reason = %reason, "Completion unavailable, answering locally");
                    }
                }
            } else {
                tracing::debug!("Assisted mode without a completion provider, answering locally");
            }
        }

        self.local_reply(message, catalog, entries)
    }

    fn local_reply(
        &self,
        message: &str,
        catalog: &CatalogSnapshot,
        entries: &[KnowledgeEntry],
    ) -> ChatReply {
        if let Some(answer) = self.matcher.find_answer(message, entries) {
            return ChatReply::new(answer, ResponsePath::Matcher);
        }

        if let Some(intent) = Intent::detect(message, catalog) {
            tracing::debug!(intent = intent.name(), "Intent matched");
            return ChatReply::new(intent.respond(catalog), ResponsePath::Intent);
        }

        self.default_reply(catalog)
    }

    fn default_reply(&self, catalog: &CatalogSnapshot) -> ChatReply {
        ChatReply::new(
            self.config.replies.default_reply(&catalog.locations()),
            ResponsePath::Default,
        )
    }
}

impl fmt::Debug for ResponseOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseOrchestrator")
            .field("mode", &self.config.mode)
            .field("has_completion_provider", &self.completion.is_some())
            .finish_non_exhaustive()
    }
}

fn record_reply(reply: &ChatReply) {
    metrics::counter!("chatbot.responses", "path" => reply.path.as_str()).increment(1);
    tracing::info!(path = %reply.path, "Chat reply produced");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_path_labels() {
        assert_eq!(ResponsePath::Completion.as_str(), "completion");
        assert_eq!(ResponsePath::Apology.to_string(), "apology");
    }
}
