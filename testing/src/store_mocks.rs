//! In-memory store and provider mocks.
//!
//! Every mock is cheap to clone and shares its state between clones, so a test
//! can hand one clone to the orchestrator and keep another for assertions.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned locks

use dudu_hub_core::BoxFuture;
use dudu_hub_core::catalog::{CatalogError, CatalogSource, Offering};
use dudu_hub_core::completion::{CompletionError, CompletionProvider, CompletionRequest};
use dudu_hub_core::conversation::{
    ConversationLog, ConversationLogEntry, ConversationLogError, SessionId,
};
use dudu_hub_core::knowledge::{KnowledgeEntry, KnowledgeStore, KnowledgeStoreError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Vector-backed knowledge store.
///
/// # Example
///
/// ```
/// use dudu_hub_testing::InMemoryKnowledgeStore;
/// use dudu_hub_core::knowledge::{KnowledgeEntry, KnowledgeStore};
///
/// # async fn example() {
/// let store = InMemoryKnowledgeStore::new(vec![KnowledgeEntry::new("how to book", "Step 1...")]);
/// assert_eq!(store.load_entries().await.unwrap().len(), 1);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryKnowledgeStore {
    entries: Arc<RwLock<Vec<KnowledgeEntry>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryKnowledgeStore {
    /// Create a store holding `entries`, in order.
    #[must_use]
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent read and write fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Replace all entries.
    pub fn replace(&self, entries: Vec<KnowledgeEntry>) {
        *self.entries.write().unwrap() = entries;
    }

    fn check(&self) -> Result<(), KnowledgeStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(KnowledgeStoreError::DatabaseError(
                "injected knowledge store failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl KnowledgeStore for InMemoryKnowledgeStore {
    fn load_entries(&self) -> BoxFuture<'_, Result<Vec<KnowledgeEntry>, KnowledgeStoreError>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.entries.read().unwrap().clone())
        })
    }

    fn add_entry(&self, entry: KnowledgeEntry) -> BoxFuture<'_, Result<(), KnowledgeStoreError>> {
        Box::pin(async move {
            self.check()?;
            self.entries.write().unwrap().push(entry);
            Ok(())
        })
    }
}

/// Append-only in-memory conversation log with failure injection.
#[derive(Clone, Debug, Default)]
pub struct InMemoryConversationLog {
    entries: Arc<RwLock<Vec<ConversationLogEntry>>>,
    failing: Arc<AtomicBool>,
    attempts: Arc<AtomicUsize>,
}

impl InMemoryConversationLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log whose writes always fail.
    #[must_use]
    pub fn failing() -> Self {
        let log = Self::default();
        log.set_failing(true);
        log
    }

    /// Toggle write failures.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All stored entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ConversationLogEntry> {
        self.entries.read().unwrap().clone()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Number of `append` calls, including failed ones.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ConversationLog for InMemoryConversationLog {
    fn append(&self, entry: ConversationLogEntry) -> BoxFuture<'_, Result<(), ConversationLogError>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ConversationLogError::Unavailable(
                    "injected log failure".to_string(),
                ));
            }
            self.entries.write().unwrap().push(entry);
            Ok(())
        })
    }

    fn recent<'a>(
        &'a self,
        session_id: &'a SessionId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ConversationLogEntry>, ConversationLogError>> {
        Box::pin(async move {
            Ok(self
                .entries
                .read()
                .unwrap()
                .iter()
                .rev()
                .filter(|e| &e.session_id == session_id)
                .take(limit)
                .cloned()
                .collect())
        })
    }
}

/// Fixed catalog that can be switched to "unavailable".
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    offerings: Arc<RwLock<Vec<Offering>>>,
    unavailable: Arc<AtomicBool>,
}

impl StaticCatalog {
    /// Catalog with the given active offerings.
    #[must_use]
    pub fn new(offerings: Vec<Offering>) -> Self {
        Self {
            offerings: Arc::new(RwLock::new(offerings)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Catalog whose reads always fail.
    #[must_use]
    pub fn unavailable() -> Self {
        let catalog = Self::default();
        catalog.set_unavailable(true);
        catalog
    }

    /// Toggle read failures.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl CatalogSource for StaticCatalog {
    fn list_active(&self) -> BoxFuture<'_, Result<Vec<Offering>, CatalogError>> {
        Box::pin(async move {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(CatalogError::Unavailable("injected catalog failure".to_string()));
            }
            Ok(self.offerings.read().unwrap().clone())
        })
    }
}

#[derive(Clone, Debug)]
enum Script {
    Reply(String),
    Fail(CompletionError),
}

/// Completion provider returning a scripted result, optionally after a delay.
///
/// Records every request it receives.
#[derive(Clone, Debug)]
pub struct ScriptedCompletionProvider {
    script: Script,
    delay: Option<Duration>,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl ScriptedCompletionProvider {
    /// Always answer `text`.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(text.into()))
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: CompletionError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    /// Always answer with blank text.
    #[must_use]
    pub fn empty() -> Self {
        Self::replying("   ")
    }

    /// Wait `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().unwrap().clone()
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl CompletionProvider for ScriptedCompletionProvider {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, CompletionError>> {
        Box::pin(async move {
            self.requests.write().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::Fail(error) => Err(error.clone()),
            }
        })
    }
}
