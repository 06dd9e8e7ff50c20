//! Document service
//!
//! Entry point for the HTTP layer: validates owner and name, then hands off
//! to the record store, the version gate or the sync resolver.

use std::sync::Arc;

use serde_json::Value;
use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::db::{Document, DocumentRepository};
use crate::error::{StoreError, StoreResult};
use crate::sync::{SyncOutcome, SyncResolver, VersionGate};

/// Longest accepted document name, in characters
pub const MAX_NAME_LEN: usize = 255;

/// Façade over the document store and sync logic
#[derive(Clone)]
pub struct DocumentService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl DocumentService {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn repo(&self) -> DocumentRepository<'_> {
        DocumentRepository::new(&self.pool, self.clock.as_ref())
    }

    /// List an owner's documents, most recently modified first
    pub async fn list(&self, owner: &str) -> StoreResult<Vec<Document>> {
        validate_owner(owner)?;
        self.repo().list_by_owner(owner).await
    }

    pub async fn get(&self, owner: &str, name: &str) -> StoreResult<Document> {
        validate_owner(owner)?;
        validate_name(name)?;
        self.repo()
            .find(owner, name)
            .await?
            .ok_or_else(|| StoreError::not_found(owner, name))
    }

    pub async fn create(&self, owner: &str, name: &str, content: &Value) -> StoreResult<Document> {
        validate_owner(owner)?;
        validate_name(name)?;
        self.repo().create(owner, name, content).await
    }

    /// Replace content, provided `expected_version` is still current
    pub async fn update(
        &self,
        owner: &str,
        name: &str,
        content: &Value,
        expected_version: i64,
    ) -> StoreResult<Document> {
        validate_owner(owner)?;
        validate_name(name)?;
        VersionGate::new(self.repo())
            .write(owner, name, content, expected_version)
            .await
    }

    /// Create the document, or overwrite the version just read
    ///
    /// Still gated: a writer that lands between the read and the write makes
    /// this fail with `VersionConflict` (or `AlreadyExists` for a racing create).
    pub async fn upsert(&self, owner: &str, name: &str, content: &Value) -> StoreResult<Document> {
        validate_owner(owner)?;
        validate_name(name)?;
        let repo = self.repo();
        match repo.find(owner, name).await? {
            Some(existing) => {
                VersionGate::new(repo)
                    .write(owner, name, content, existing.version)
                    .await
            }
            None => repo.create(owner, name, content).await,
        }
    }

    pub async fn delete(&self, owner: &str, name: &str) -> StoreResult<()> {
        validate_owner(owner)?;
        validate_name(name)?;
        if self.repo().delete(owner, name).await? {
            Ok(())
        } else {
            Err(StoreError::not_found(owner, name))
        }
    }

    /// Remove every document of an owner
    pub async fn delete_all(&self, owner: &str) -> StoreResult<u64> {
        validate_owner(owner)?;
        self.repo().delete_all_for_owner(owner).await
    }

    /// Timestamp-based sync of one document
    pub async fn synchronize(
        &self,
        owner: &str,
        name: &str,
        content: &Value,
        client_timestamp: i64,
    ) -> StoreResult<SyncOutcome> {
        validate_owner(owner)?;
        validate_name(name)?;
        SyncResolver::new(self.repo())
            .synchronize(owner, name, content, client_timestamp)
            .await
    }
}

fn validate_owner(owner: &str) -> StoreResult<()> {
    if owner.trim().is_empty() {
        return Err(StoreError::InvalidInput("owner must not be empty".to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidInput(
            "document name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::InvalidInput(format!(
            "document name longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}
