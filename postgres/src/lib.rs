//! `PostgreSQL` stores for the DUDU Industrial Visit Hub chatbot.
//!
//! Implements the storage traits from `dudu-hub-core` on top of a shared
//! [`PgPool`]:
//!
//! - [`PostgresCatalog`]: active rows of the `industrials` table
//! - [`PostgresKnowledgeStore`]: the `chatbot_knowledge` table
//! - [`PostgresConversationLog`]: the append-only `chatbot_logs` table
//!
//! Queries are built at runtime with `sqlx::query` and `bind`, so the crate
//! compiles without a live database.
//!
//! # Example
//!
//! ```no_run
//! use dudu_hub_postgres::{PostgresCatalog, connect, migrate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect("postgres://localhost/dudu", 10).await?;
//! migrate(&pool).await?;
//! let catalog = PostgresCatalog::new(pool);
//! # Ok(())
//! # }
//! ```

mod catalog;
mod conversation;
mod knowledge;

pub use catalog::PostgresCatalog;
pub use conversation::PostgresConversationLog;
pub use knowledge::PostgresKnowledgeStore;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Open a connection pool.
///
/// # Errors
///
/// Returns the `sqlx` error if the database cannot be reached.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    tracing::info!(max_connections, "PostgreSQL pool connected");
    Ok(pool)
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns the migration error if any script fails.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
