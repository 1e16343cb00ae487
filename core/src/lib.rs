//! # DUDU Hub Core
//!
//! Chatbot core for the DUDU Industrial Visit Hub ("Panda Bot").
//!
//! This crate owns everything that decides *what* the chatbot says:
//!
//! - **Knowledge**: stored question/answer pairs ([`knowledge::KnowledgeEntry`])
//! - **Matcher**: keyword overlap scoring over the knowledge snapshot
//! - **Intents**: catalog-aware replies tried when the matcher has no confident match
//! - **Completion**: optional external AI completion with explicit fallback
//! - **Conversation**: append-only conversation logging
//! - **Orchestrator**: the single `answer` entry point tying it all together
//!
//! Storage and transport live elsewhere (`dudu-hub-postgres`, `dudu-hub-web`);
//! this crate only defines the traits they implement.
//!
//! ## Example
//!
//! ```ignore
//! use dudu_hub_core::prelude::*;
//! use std::sync::Arc;
//!
//! let orchestrator = ResponseOrchestrator::new(
//!     ChatbotConfig::default(),
//!     knowledge_store,
//!     catalog_source,
//!     ConversationLogger::new(conversation_log, Arc::new(SystemClock)),
//! );
//!
//! let reply = orchestrator
//!     .answer("How do I book a visit?", None, &SessionId::generate())
//!     .await;
//! ```

use std::future::Future;
use std::pin::Pin;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod intents;
pub mod knowledge;
pub mod matcher;
pub mod orchestrator;

/// Boxed, sendable future returned by the storage and provider traits.
///
/// The traits in this crate return `BoxFuture` instead of using `async fn`
/// so they can be used as trait objects (`Arc<dyn KnowledgeStore>`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Environment module - injected dependencies that are not storage
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use dudu_hub_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let _now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

/// Convenience re-exports for wiring the chatbot together.
pub mod prelude {
    pub use crate::catalog::{CatalogError, CatalogSnapshot, CatalogSource, Offering};
    pub use crate::completion::{
        AnthropicCompletion, CompletionError, CompletionOutcome, CompletionProvider,
        CompletionRequest, FallbackReason,
    };
    pub use crate::config::{ChatbotConfig, ReplyTexts, ResponseMode};
    pub use crate::conversation::{
        ConversationLog, ConversationLogEntry, ConversationLogError, ConversationLogger,
        SessionId, UserRef,
    };
    pub use crate::environment::{Clock, SystemClock};
    pub use crate::knowledge::{
        JsonFileKnowledgeStore, KnowledgeEntry, KnowledgeStore, KnowledgeStoreError,
    };
    pub use crate::matcher::{MatcherWeights, QueryMatcher, ScoredEntry, Stopwords};
    pub use crate::orchestrator::{ChatReply, ResponseOrchestrator, ResponsePath};
}

#[cfg(test)]
mod tests {
    use super::environment::{Clock, SystemClock};

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
