//! Database module for SQLite persistence
//!
//! Holds the schema and the document record store.

mod documents;
mod schema;

pub use documents::*;
pub use schema::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::StoreResult;

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await?;

    // Run migrations
    initialize_schema(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Single-connection in-memory database; every pooled connection to
    /// `:memory:` would otherwise get its own empty database.
    pub async fn memory_pool() -> SqlitePool {
        create_pool(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap()
    }

    /// File-backed database with several connections, for concurrency tests.
    pub async fn file_pool(dir: &tempfile::TempDir) -> SqlitePool {
        let path = dir.path().join("sync.db");
        create_pool(&DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 8,
        })
        .await
        .unwrap()
    }
}
