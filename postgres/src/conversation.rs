//! Conversation log stored in `chatbot_logs`.

use chrono::{DateTime, Utc};
use dudu_hub_core::BoxFuture;
use dudu_hub_core::conversation::{
    ConversationLog, ConversationLogEntry, ConversationLogError, SessionId, UserRef,
};
use sqlx::{PgPool, Row};

/// Append-only [`ConversationLog`] over the `chatbot_logs` table.
#[derive(Debug, Clone)]
pub struct PostgresConversationLog {
    pool: PgPool,
}

impl PostgresConversationLog {
    /// Create a log using `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ConversationLog for PostgresConversationLog {
    fn append(&self, entry: ConversationLogEntry) -> BoxFuture<'_, Result<(), ConversationLogError>> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO chatbot_logs (user_ref, session_id, query, response, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(entry.user_ref.as_ref().map(UserRef::as_str))
            .bind(entry.session_id.as_str())
            .bind(&entry.query)
            .bind(&entry.response)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| ConversationLogError::DatabaseError(e.to_string()))?;

            Ok(())
        })
    }

    fn recent<'a>(
        &'a self,
        session_id: &'a SessionId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ConversationLogEntry>, ConversationLogError>> {
        Box::pin(async move {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);

            let rows = sqlx::query(
                r"
                SELECT user_ref, session_id, query, response, created_at
                FROM chatbot_logs
                WHERE session_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                ",
            )
            .bind(session_id.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ConversationLogError::DatabaseError(e.to_string()))?;

            rows.iter()
                .map(|row| {
                    let user_ref: Option<String> = row.try_get("user_ref")?;
                    let session_id: String = row.try_get("session_id")?;
                    let created_at: DateTime<Utc> = row.try_get("created_at")?;
                    Ok(ConversationLogEntry {
                        session_id: SessionId::new(session_id),
                        user_ref: user_ref.map(UserRef::new),
                        query: row.try_get("query")?,
                        response: row.try_get("response")?,
                        created_at,
                    })
                })
                .collect::<Result<Vec<_>, sqlx::Error>>()
                .map_err(|e| ConversationLogError::DatabaseError(e.to_string()))
        })
    }
}
