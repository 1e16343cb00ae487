//! End-to-end tests for `ResponseOrchestrator` over in-memory mocks.

#![allow(clippy::unwrap_used)] // Test code
#![allow(clippy::expect_used)] // Test code

use dudu_hub_core::prelude::*;
use dudu_hub_testing::fixtures::{ABOUT_ANSWER, BOOKING_ANSWER};
use dudu_hub_testing::properties::any_message;
use dudu_hub_testing::{ChatbotHarness, ScriptedCompletionProvider};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn session() -> SessionId {
    SessionId::new("session-1")
}

fn assisted() -> ChatbotConfig {
    ChatbotConfig::new(ResponseMode::Assisted).with_completion_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn test_booking_question_returns_stored_answer() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());
    let user = UserRef::new("user-9");

    let reply = orchestrator
        .respond("How do I book a visit?", Some(&user), &session())
        .await;

    assert_eq!(reply.text, BOOKING_ANSWER);
    assert_eq!(reply.path, ResponsePath::Matcher);

    let entries = harness.log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].session_id, session());
    assert_eq!(entries[0].user_ref, Some(user));
    assert_eq!(entries[0].query, "How do I book a visit?");
    assert_eq!(entries[0].response, BOOKING_ANSWER);
}

#[tokio::test]
async fn test_empty_message_gets_prompt_and_is_not_logged() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    for message in ["", "   ", "\n\t"] {
        let reply = orchestrator.respond(message, None, &session()).await;
        assert_eq!(reply.text, ReplyTexts::default().prompt);
        assert_eq!(reply.path, ResponsePath::Prompt);
    }

    assert_eq!(harness.log.attempts(), 0);
}

#[tokio::test]
async fn test_no_knowledge_and_no_catalog_gets_default_reply() {
    let harness = ChatbotHarness::empty();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    for message in ["tell me something", "hello", "what does it cost"] {
        let reply = orchestrator.respond(message, None, &session()).await;
        assert_eq!(reply.text, ReplyTexts::default().default_reply(&[]));
        assert_eq!(reply.path, ResponsePath::Default);
    }

    assert_eq!(harness.log.len(), 3);
}

#[tokio::test]
async fn test_whole_question_inside_message_dominates() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator
        .answer("hey tell me what is dudu please", None, &session())
        .await;

    assert_eq!(reply, ABOUT_ANSWER);
}

#[tokio::test]
async fn test_ties_go_to_earlier_entry() {
    let harness = ChatbotHarness::new();
    harness.knowledge.replace(vec![
        KnowledgeEntry::new("visit price", "first"),
        KnowledgeEntry::new("price visit", "second"),
    ]);
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator.answer("price of a visit", None, &session()).await;

    assert_eq!(reply, "first");
}

#[tokio::test]
async fn test_log_failure_does_not_affect_reply() {
    let harness = ChatbotHarness::new();
    harness.log.set_failing(true);
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator
        .answer("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply, BOOKING_ANSWER);
    assert_eq!(harness.log.attempts(), 1);
    assert!(harness.log.is_empty());
}

#[tokio::test]
async fn test_catalog_failure_returns_apology_and_skips_matching() {
    let harness = ChatbotHarness::new();
    harness.catalog.set_unavailable(true);
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator
        .respond("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply.text, ReplyTexts::default().apology);
    assert_eq!(reply.path, ResponsePath::Apology);
    assert_eq!(harness.log.entries()[0].response, ReplyTexts::default().apology);
}

#[tokio::test]
async fn test_catalog_failure_skips_provider() {
    let harness = ChatbotHarness::new();
    harness.catalog.set_unavailable(true);
    let provider = ScriptedCompletionProvider::replying("from provider");
    let orchestrator = harness
        .orchestrator(assisted())
        .with_completion_provider(Arc::new(provider.clone()));

    let reply = orchestrator.respond("hello", None, &session()).await;

    assert_eq!(reply.path, ResponsePath::Apology);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_knowledge_failure_is_treated_as_empty() {
    let harness = ChatbotHarness::new();
    harness.knowledge.set_failing(true);
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator
        .respond("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply.path, ResponsePath::Intent);
    assert!(reply.text.starts_with("Ready to book?"));
}

#[tokio::test]
async fn test_greeting_intent_names_locations() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator.respond("hi", None, &session()).await;

    assert_eq!(reply.path, ResponsePath::Intent);
    assert!(reply.text.contains("Chennai, Ooty"));
}

#[tokio::test]
async fn test_location_intent_lists_offerings() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator
        .answer("anything in chennai?", None, &session())
        .await;

    assert!(reply.contains("We have 2 industrial visits in Chennai"));
    assert!(reply.contains("• Steel Plant Visit (₹2000, 1 Day)"));
    assert!(reply.contains("• Auto Assembly Line (₹2500, 1 Day)"));
}

#[tokio::test]
async fn test_pricing_intent_quotes_lowest_price() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator.answer("is it expensive", None, &session()).await;

    assert!(reply.contains("start from just ₹1500!"));
}

#[tokio::test]
async fn test_blank_stored_answer_is_never_returned() {
    let harness = ChatbotHarness::new();
    harness.knowledge.replace(vec![KnowledgeEntry::new("refund rules", "  ")]);
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let reply = orchestrator.respond("refund rules", None, &session()).await;

    assert_eq!(reply.path, ResponsePath::Default);
    assert!(reply.text.contains("We serve Chennai, Ooty."));
}

#[tokio::test]
async fn test_provider_success_is_returned_verbatim() {
    let harness = ChatbotHarness::new();
    let provider = ScriptedCompletionProvider::replying("Visits start at ₹1500 in Ooty! 🐼");
    let orchestrator = harness
        .orchestrator(assisted())
        .with_completion_provider(Arc::new(provider.clone()));

    let reply = orchestrator
        .respond("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply.text, "Visits start at ₹1500 in Ooty! 🐼");
    assert_eq!(reply.path, ResponsePath::Completion);
    assert_eq!(harness.log.entries()[0].response, reply.text);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message, "How do I book a visit?");
    assert!(requests[0].system.contains("Steel Plant Visit in Chennai"));
    assert!(requests[0].system.contains("Q: how to book"));
    assert!(!requests[0].system.contains("Q: cancellation policy"));
}

#[tokio::test]
async fn test_provider_failure_falls_back_to_matcher() {
    for error in [
        CompletionError::Unauthorized,
        CompletionError::RateLimited,
        CompletionError::Transport("connection reset".to_string()),
        CompletionError::Malformed("bad json".to_string()),
    ] {
        let harness = ChatbotHarness::new();
        let orchestrator = harness
            .orchestrator(assisted())
            .with_completion_provider(Arc::new(ScriptedCompletionProvider::failing(error)));

        let reply = orchestrator
            .respond("How do I book a visit?", None, &session())
            .await;

        assert_eq!(reply.text, BOOKING_ANSWER);
        assert_eq!(reply.path, ResponsePath::Matcher);
    }
}

#[tokio::test]
async fn test_empty_completion_falls_back() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness
        .orchestrator(assisted())
        .with_completion_provider(Arc::new(ScriptedCompletionProvider::empty()));

    let reply = orchestrator
        .answer("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply, BOOKING_ANSWER);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out_and_falls_back() {
    let harness = ChatbotHarness::new();
    let provider =
        ScriptedCompletionProvider::replying("too late").with_delay(Duration::from_secs(30));
    let orchestrator = harness
        .orchestrator(assisted())
        .with_completion_provider(Arc::new(provider));

    let reply = orchestrator
        .respond("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply.text, BOOKING_ANSWER);
    assert_eq!(reply.path, ResponsePath::Matcher);
}

#[tokio::test]
async fn test_local_mode_never_calls_provider() {
    let harness = ChatbotHarness::new();
    let provider = ScriptedCompletionProvider::replying("from provider");
    let orchestrator = harness
        .orchestrator(ChatbotConfig::new(ResponseMode::Local))
        .with_completion_provider(Arc::new(provider.clone()));

    let reply = orchestrator.answer("hello", None, &session()).await;

    assert_ne!(reply, "from provider");
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_assisted_mode_without_provider_answers_locally() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(assisted());

    let reply = orchestrator
        .answer("How do I book a visit?", None, &session())
        .await;

    assert_eq!(reply, BOOKING_ANSWER);
}

#[tokio::test]
async fn test_knowledge_edits_visible_on_next_message() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());

    let before = orchestrator.respond("refund rules", None, &session()).await;
    assert_ne!(before.path, ResponsePath::Matcher);

    harness
        .knowledge
        .add_entry(KnowledgeEntry::new("refund rules", "Refunds take 5 working days."))
        .await
        .unwrap();

    let after = orchestrator.answer("refund rules", None, &session()).await;
    assert_eq!(after, "Refunds take 5 working days.");
}

#[tokio::test]
async fn test_recent_returns_session_history_newest_first() {
    let harness = ChatbotHarness::new();
    let orchestrator = harness.orchestrator(ChatbotConfig::default());
    let other = SessionId::new("session-2");

    orchestrator.answer("hi", None, &session()).await;
    orchestrator.answer("thanks", None, &other).await;
    orchestrator.answer("How do I book a visit?", None, &session()).await;

    let recent = orchestrator.logger().recent(&session(), 10).await.unwrap();
    let queries: Vec<&str> = recent.iter().map(|e| e.query.as_str()).collect();
    assert_eq!(queries, vec!["How do I book a visit?", "hi"]);
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

proptest! {
    #[test]
    fn prop_answer_is_never_empty(message in any_message()) {
        let harness = ChatbotHarness::new();
        let orchestrator = harness.orchestrator(ChatbotConfig::default());

        let reply = block_on(orchestrator.answer(&message, None, &session()));
        prop_assert!(!reply.trim().is_empty());
    }

    #[test]
    fn prop_answer_is_never_empty_with_failures(message in any_message()) {
        let harness = ChatbotHarness::empty();
        harness.knowledge.set_failing(true);
        harness.log.set_failing(true);
        let orchestrator = harness
            .orchestrator(assisted())
            .with_completion_provider(Arc::new(ScriptedCompletionProvider::failing(
                CompletionError::RateLimited,
            )));

        let reply = block_on(orchestrator.answer(&message, None, &session()));
        prop_assert!(!reply.trim().is_empty());
    }

    #[test]
    fn prop_local_answers_are_deterministic(message in any_message()) {
        let harness = ChatbotHarness::new();
        let orchestrator = harness.orchestrator(ChatbotConfig::default());

        let first = block_on(orchestrator.respond(&message, None, &session()));
        let second = block_on(orchestrator.respond(&message, None, &session()));
        prop_assert_eq!(first, second);
    }
}
