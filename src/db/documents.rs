//! Document record store
//!
//! Durable CRUD for synchronized documents keyed by (owner, name). This is
//! the only place where `version` and `last_modified` are written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::clock::{self, Clock};
use crate::error::{StoreError, StoreResult};

/// A stored document snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub owner: String,
    pub name: String,
    pub content: Value,
    /// Starts at 1, +1 per applied update
    pub version: i64,
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// `last_modified` as epoch milliseconds, the scale clients sync with
    pub fn last_modified_millis(&self) -> i64 {
        self.last_modified.timestamp_millis()
    }
}

/// Document repository
#[derive(Clone, Copy)]
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
    clock: &'a dyn Clock,
}

const SELECT_COLUMNS: &str = "owner, name, content, version, last_modified, created_at";

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool, clock: &'a dyn Clock) -> Self {
        Self { pool, clock }
    }

    /// List an owner's documents, most recently modified first
    pub async fn list_by_owner(&self, owner: &str) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM documents
            WHERE owner = ?
            ORDER BY last_modified DESC, name ASC
            "#
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    /// Get a specific document
    pub async fn find(&self, owner: &str, name: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM documents
            WHERE owner = ? AND name = ?
            "#
        ))
        .bind(owner)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    /// Create a new document at version 1
    ///
    /// The unique index on (owner, name) decides concurrent creates; the loser
    /// gets `AlreadyExists`.
    pub async fn create(&self, owner: &str, name: &str, content: &Value) -> StoreResult<Document> {
        let content_json = serde_json::to_string(content)?;
        let now = self.clock.now().timestamp_millis();

        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            INSERT INTO documents (owner, name, content, version, last_modified, created_at)
            VALUES (?, ?, ?, 1, ?, ?)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(name)
        .bind(&content_json)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::already_exists(owner, name)
            }
            sqlx::Error::Database(ref db) if db.is_check_violation() => {
                StoreError::InvalidInput(format!("rejected document name: {:?}", name))
            }
            other => StoreError::from(other),
        })?;

        tracing::info!(owner = %owner, name = %name, "Created document");

        row.into_document()
    }

    /// Replace content if and only if the stored version equals `expected_version`
    ///
    /// Runs as one guarded UPDATE, so concurrent callers holding the same
    /// `expected_version` are linearized by SQLite and at most one applies.
    /// Returns the new snapshot when applied, `None` when the predicate failed
    /// (stale version or no such document). Nothing changes in the latter case.
    pub async fn conditional_update(
        &self,
        owner: &str,
        name: &str,
        content: &Value,
        expected_version: i64,
    ) -> StoreResult<Option<Document>> {
        let content_json = serde_json::to_string(content)?;
        let now = self.clock.now().timestamp_millis();

        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            UPDATE documents
            SET content = ?,
                version = version + 1,
                last_modified = MAX(last_modified, ?)
            WHERE owner = ? AND name = ? AND version = ?
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&content_json)
        .bind(now)
        .bind(owner)
        .bind(name)
        .bind(expected_version)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let document = row.into_document()?;
                tracing::info!(
                    owner = %owner,
                    name = %name,
                    version = document.version,
                    "Updated document"
                );
                Ok(Some(document))
            }
            None => {
                tracing::debug!(
                    owner = %owner,
                    name = %name,
                    expected_version = expected_version,
                    "Conditional update not applied"
                );
                Ok(None)
            }
        }
    }

    /// Delete a document. No tombstone is kept.
    pub async fn delete(&self, owner: &str, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE owner = ? AND name = ?")
            .bind(owner)
            .bind(name)
            .execute(self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(owner = %owner, name = %name, "Deleted document");
        }

        Ok(removed)
    }

    /// Delete every document of an owner, e.g. when the account goes away
    pub async fn delete_all_for_owner(&self, owner: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE owner = ?")
            .bind(owner)
            .execute(self.pool)
            .await?;

        let count = result.rows_affected();
        tracing::info!(owner = %owner, count = count, "Deleted all documents for owner");

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    owner: String,
    name: String,
    content: String,
    version: i64,
    last_modified: i64,
    created_at: i64,
}

impl DocumentRow {
    fn into_document(self) -> StoreResult<Document> {
        Ok(Document {
            content: serde_json::from_str(&self.content)?,
            owner: self.owner,
            name: self.name,
            version: self.version,
            last_modified: clock::from_millis(self.last_modified),
            created_at: clock::from_millis(self.created_at),
        })
    }
}
