//! SQL store handle for the bookstore service.
//!
//! [`Database`] owns the process-wide connection pool. It is opened once at
//! startup, handed to modules by reference, and closed explicitly on shutdown.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (module, id)
)";

/// Process-wide store handle wrapping a connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool against `url`.
    ///
    /// In-memory stores live only as long as their connection, so they are
    /// pinned to a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to database '{url}'"))?;

        tracing::info!(target: "bookstore-db", %url, in_memory, "database pool opened");
        Ok(Self { pool })
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply a migration once, recording it in the `_migrations` ledger.
    ///
    /// Returns `true` when the script ran, `false` when it was already applied.
    pub async fn apply_migration(&self, module: &str, id: &str, up: &str) -> anyhow::Result<bool> {
        sqlx::query(MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create migrations ledger")?;

        let applied: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ?1 AND id = ?2")
                .bind(module)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("failed to read migrations ledger")?;

        if applied.is_some() {
            tracing::debug!(target: "bookstore-db", module, id, "migration already applied");
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        sqlx::raw_sql(up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration '{module}/{id}' failed"))?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?1, ?2)")
            .bind(module)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "bookstore-db", module, id, "migration applied");
        Ok(true)
    }

    /// Close every pooled connection. Waits for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookstore-db", "database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migration_runs_once() {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let up = "CREATE TABLE widgets (id INTEGER PRIMARY KEY);";

        assert!(db.apply_migration("widgets", "001_init", up).await.unwrap());
        assert!(!db.apply_migration("widgets", "001_init", up).await.unwrap());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();

        let result = db.apply_migration("broken", "001_init", "CREATE TABLE (").await;
        assert!(result.is_err());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn close_releases_pool() {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        db.close().await;
        assert!(db.is_closed());
    }
}
