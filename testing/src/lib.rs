//! # DUDU Hub Testing
//!
//! Testing utilities for the DUDU Industrial Visit Hub chatbot.
//!
//! This crate provides:
//! - In-memory implementations of the core storage traits, with failure
//!   injection
//! - A scripted completion provider
//! - A fixed clock
//! - Sample catalog and knowledge fixtures, and a harness wiring them into a
//!   `ResponseOrchestrator`
//! - proptest strategies for chat messages
//!
//! ## Example
//!
//! ```
//! use dudu_hub_testing::ChatbotHarness;
//! use dudu_hub_core::prelude::*;
//!
//! # async fn example() {
//! let harness = ChatbotHarness::new();
//! let orchestrator = harness.orchestrator(ChatbotConfig::default());
//!
//! let reply = orchestrator
//!     .answer("How do I book a visit?", None, &SessionId::new("s-1"))
//!     .await;
//! assert!(reply.starts_with("Step 1"));
//! assert_eq!(harness.log.len(), 1);
//! # }
//! ```

use chrono::{DateTime, Utc};
use dudu_hub_core::environment::Clock;

mod harness;
mod store_mocks;

pub use harness::{ChatbotHarness, fixtures};
pub use store_mocks::{
    InMemoryConversationLog, InMemoryKnowledgeStore, ScriptedCompletionProvider, StaticCatalog,
};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use dudu_hub_testing::mocks::FixedClock;
    /// use dudu_hub_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Property-based testing strategies using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Words that trigger knowledge entries, intents or nothing at all.
    const VOCABULARY: &[&str] = &[
        "hello", "book", "booking", "price", "chennai", "ooty", "what", "is", "dudu", "the",
        "visit", "thanks", "food", "days", "list", "random", "zebra", "please", "🐼", "?",
    ];

    /// Arbitrary text, including empty, whitespace-only and non-ASCII input.
    pub fn any_message() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[ \t\n]{1,5}",
            "\\PC{0,80}",
            vocabulary_message(),
        ]
    }

    /// Messages built from chatbot vocabulary, so that every path gets hit.
    pub fn vocabulary_message() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(VOCABULARY), 1..8).prop_map(|words| words.join(" "))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
