//! Knowledge entries stored in `chatbot_knowledge`.

use dudu_hub_core::BoxFuture;
use dudu_hub_core::knowledge::{KnowledgeEntry, KnowledgeStore, KnowledgeStoreError};
use sqlx::PgPool;

/// [`KnowledgeStore`] over the `chatbot_knowledge` table.
///
/// Entries load in `id` order, which is the order the matcher uses to break
/// ties.
#[derive(Debug, Clone)]
pub struct PostgresKnowledgeStore {
    pool: PgPool,
}

impl PostgresKnowledgeStore {
    /// Create a store using `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl KnowledgeStore for PostgresKnowledgeStore {
    fn load_entries(&self) -> BoxFuture<'_, Result<Vec<KnowledgeEntry>, KnowledgeStoreError>> {
        Box::pin(async move {
            let rows: Vec<(String, String)> =
                sqlx::query_as("SELECT question, answer FROM chatbot_knowledge ORDER BY id ASC")
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| KnowledgeStoreError::DatabaseError(e.to_string()))?;

            Ok(rows
                .into_iter()
                .map(|(question, answer)| KnowledgeEntry { question, answer })
                .collect())
        })
    }

    fn add_entry(&self, entry: KnowledgeEntry) -> BoxFuture<'_, Result<(), KnowledgeStoreError>> {
        Box::pin(async move {
            let id: (i64,) = sqlx::query_as(
                "INSERT INTO chatbot_knowledge (question, answer) VALUES ($1, $2) RETURNING id",
            )
            .bind(&entry.question)
            .bind(&entry.answer)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| KnowledgeStoreError::DatabaseError(e.to_string()))?;

            tracing::info!(knowledge_id = id.0, question = %entry.question, "Knowledge entry added");
            Ok(())
        })
    }
}
