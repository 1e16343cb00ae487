//! Active catalog read from the `industrials` table.

use dudu_hub_core::BoxFuture;
use dudu_hub_core::catalog::{CatalogError, CatalogSource, Offering};
use sqlx::{PgPool, Row};

/// [`CatalogSource`] over the `industrials` table.
///
/// Only `status = 'active'` rows are returned, newest first.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a catalog reading from `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check that the database answers.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the query fails.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

impl CatalogSource for PostgresCatalog {
    fn list_active(&self) -> BoxFuture<'_, Result<Vec<Offering>, CatalogError>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT id, title, location, price::FLOAT8 AS price, duration, description
                FROM industrials
                WHERE status = 'active'
                ORDER BY created_at DESC, id DESC
                ",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                metrics::counter!("catalog.read_failures").increment(1);
                CatalogError::Unavailable(e.to_string())
            })?;

            rows.iter()
                .map(|row| {
                    Ok(Offering {
                        id: row.try_get("id")?,
                        title: row.try_get("title")?,
                        location: row.try_get("location")?,
                        price: row.try_get("price")?,
                        duration: row.try_get("duration")?,
                        description: row.try_get("description")?,
                    })
                })
                .collect::<Result<Vec<_>, sqlx::Error>>()
                .map_err(|e| CatalogError::Unavailable(e.to_string()))
        })
    }
}
