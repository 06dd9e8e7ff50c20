//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::StoreResult;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Synchronized documents, one row per (owner, name)
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL,
    name TEXT NOT NULL CHECK (name != ''),
    -- JSON text
    content TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1 CHECK (version >= 1),
    -- Epoch milliseconds, server clock
    last_modified INTEGER NOT NULL,
    created_at INTEGER NOT NULL,

    UNIQUE(owner, name)
);

CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner);
CREATE INDEX IF NOT EXISTS idx_documents_last_modified ON documents(owner, last_modified);
"#;

#[cfg(test)]
mod tests {
    use crate::db::testing::memory_pool;

    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = memory_pool().await;
        initialize_schema(&pool).await.unwrap();
        initialize_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_name_rejected_by_schema() {
        let pool = memory_pool().await;
        let result = sqlx::query(
            "INSERT INTO documents (owner, name, content, last_modified, created_at) VALUES ('u1', '', '{}', 0, 0)",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
