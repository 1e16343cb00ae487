//! Conversation logging.
//!
//! Every processed chat message produces at most one [`ConversationLogEntry`].
//! Entries are append-only: nothing in this crate updates or deletes them.
//!
//! The logger itself is allowed to fail. The orchestrator catches the error,
//! reports it through `tracing`, and still returns the reply.

use crate::BoxFuture;
use crate::environment::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Opaque label grouping a visitor's messages.
///
/// Supplied by the caller and never validated or expired here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a caller-supplied session label.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh random session label (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to an authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRef(String);

impl UserRef {
    /// Wrap a user identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (session, query, response) record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLogEntry {
    /// Session the message belongs to.
    pub session_id: SessionId,
    /// Authenticated user, absent for anonymous sessions.
    pub user_ref: Option<UserRef>,
    /// Visitor's message as received.
    pub query: String,
    /// Reply that was returned.
    pub response: String,
    /// When the reply was produced.
    pub created_at: DateTime<Utc>,
}

/// Errors from the conversation log store.
#[derive(Error, Debug)]
pub enum ConversationLogError {
    /// Database connection or query failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The store refused the write.
    #[error("Log store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only storage for conversation entries.
pub trait ConversationLog: Send + Sync {
    /// Append one entry. Duplicate calls produce duplicate entries.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversationLogError`] if the entry could not be persisted.
    fn append(&self, entry: ConversationLogEntry) -> BoxFuture<'_, Result<(), ConversationLogError>>;

    /// Most recent entries for `session_id`, newest first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversationLogError`] if the store cannot be read.
    fn recent<'a>(
        &'a self,
        session_id: &'a SessionId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ConversationLogEntry>, ConversationLogError>>;
}

/// Builds timestamped entries and appends them to a [`ConversationLog`].
#[derive(Clone)]
pub struct ConversationLogger {
    log: Arc<dyn ConversationLog>,
    clock: Arc<dyn Clock>,
}

impl ConversationLogger {
    /// Create a logger writing to `log`, stamping entries with `clock`.
    #[must_use]
    pub fn new(log: Arc<dyn ConversationLog>, clock: Arc<dyn Clock>) -> Self {
        Self { log, clock }
    }

    /// Record one exchange.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`ConversationLogError`]; callers on the reply
    /// path are expected to swallow it.
    pub async fn log(
        &self,
        session_id: &SessionId,
        user_ref: Option<&UserRef>,
        query: &str,
        response: &str,
    ) -> Result<ConversationLogEntry, ConversationLogError> {
        let entry = ConversationLogEntry {
            session_id: session_id.clone(),
            user_ref: user_ref.cloned(),
            query: query.to_string(),
            response: response.to_string(),
            created_at: self.clock.now(),
        };

        self.log.append(entry.clone()).await?;

        tracing::debug!(session_id = %session_id, "Conversation logged");
        Ok(entry)
    }

    /// Most recent entries for a session, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`ConversationLogError`].
    pub async fn recent(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ConversationLogEntry>, ConversationLogError> {
        self.log.recent(session_id, limit).await
    }
}

impl fmt::Debug for ConversationLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationLogger").finish_non_exhaustive()
    }
}
