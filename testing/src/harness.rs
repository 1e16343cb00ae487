//! Sample data and a harness wiring mocks into a `ResponseOrchestrator`.

use crate::mocks::test_clock;
use crate::store_mocks::{InMemoryConversationLog, InMemoryKnowledgeStore, StaticCatalog};
use dudu_hub_core::config::ChatbotConfig;
use dudu_hub_core::conversation::ConversationLogger;
use dudu_hub_core::orchestrator::ResponseOrchestrator;
use std::sync::Arc;

/// Sample catalog and knowledge.
pub mod fixtures {
    use dudu_hub_core::catalog::Offering;
    use dudu_hub_core::knowledge::KnowledgeEntry;

    /// Answer stored for "how to book".
    pub const BOOKING_ANSWER: &str = "Step 1: Open the Industrial's page. Step 2: Pick a visit. \
         Step 3: Click 'Book Now' and complete payment.";

    /// Answer stored for "what is dudu".
    pub const ABOUT_ANSWER: &str =
        "DUDU Industrial Visit Hub organises guided industrial visits for students and colleges.";

    /// Three knowledge entries, in a fixed order.
    #[must_use]
    pub fn sample_knowledge() -> Vec<KnowledgeEntry> {
        vec![
            KnowledgeEntry::new("what is dudu", ABOUT_ANSWER),
            KnowledgeEntry::new("how to book", BOOKING_ANSWER),
            KnowledgeEntry::new(
                "cancellation policy",
                "Cancel up to 7 days before the visit for a full refund.",
            ),
        ]
    }

    /// Three active offerings in Chennai and Ooty.
    #[must_use]
    pub fn sample_offerings() -> Vec<Offering> {
        vec![
            offering(1, "Steel Plant Visit", "Chennai", 2000.0, "1 Day"),
            offering(2, "Tea Factory Tour", "Ooty", 1500.0, "2 Days 1 Night"),
            offering(3, "Auto Assembly Line", "Chennai", 2500.0, "1 Day"),
        ]
    }

    /// Build an offering with a generic description.
    #[must_use]
    pub fn offering(id: i64, title: &str, location: &str, price: f64, duration: &str) -> Offering {
        Offering {
            id,
            title: title.to_string(),
            location: location.to_string(),
            price,
            duration: duration.to_string(),
            description: format!("Guided {title} with safety briefing and Q&A session."),
        }
    }
}

/// Mocks plus the wiring to build an orchestrator over them.
///
/// The mocks are shared with every orchestrator the harness builds, so tests
/// can inject failures and inspect the log after a call.
#[derive(Clone, Debug)]
pub struct ChatbotHarness {
    /// Knowledge store.
    pub knowledge: InMemoryKnowledgeStore,
    /// Catalog source.
    pub catalog: StaticCatalog,
    /// Conversation log.
    pub log: InMemoryConversationLog,
}

impl ChatbotHarness {
    /// Harness with the sample knowledge and offerings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            knowledge: InMemoryKnowledgeStore::new(fixtures::sample_knowledge()),
            catalog: StaticCatalog::new(fixtures::sample_offerings()),
            log: InMemoryConversationLog::new(),
        }
    }

    /// Harness with no knowledge and no offerings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            knowledge: InMemoryKnowledgeStore::default(),
            catalog: StaticCatalog::default(),
            log: InMemoryConversationLog::new(),
        }
    }

    /// Build an orchestrator over the harness mocks.
    #[must_use]
    pub fn orchestrator(&self, config: ChatbotConfig) -> ResponseOrchestrator {
        let logger = ConversationLogger::new(Arc::new(self.log.clone()), Arc::new(test_clock()));
        ResponseOrchestrator::new(
            config,
            Arc::new(self.knowledge.clone()),
            Arc::new(self.catalog.clone()),
            logger,
        )
    }
}

impl Default for ChatbotHarness {
    fn default() -> Self {
        Self::new()
    }
}
