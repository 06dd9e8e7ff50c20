//! Version gate
//!
//! A write is accepted only if the caller's belief about the current version
//! matches the stored one. This turns read-modify-write races into a
//! detectable rejection instead of a silent overwrite.

use serde_json::Value;

use crate::db::{Document, DocumentRepository};
use crate::error::{StoreError, StoreResult};

/// Optimistic-concurrency guard over [`DocumentRepository::conditional_update`]
#[derive(Clone, Copy)]
pub struct VersionGate<'a> {
    repo: DocumentRepository<'a>,
}

impl<'a> VersionGate<'a> {
    pub fn new(repo: DocumentRepository<'a>) -> Self {
        Self { repo }
    }

    /// Attempt a version-guarded write
    ///
    /// `Ok(None)` means another writer got there first (or the document is
    /// gone). The caller must re-fetch before deciding to retry; retrying with
    /// the same `expected_version` can never succeed.
    pub async fn try_write(
        &self,
        owner: &str,
        name: &str,
        content: &Value,
        expected_version: i64,
    ) -> StoreResult<Option<Document>> {
        let applied = self
            .repo
            .conditional_update(owner, name, content, expected_version)
            .await?;

        if applied.is_none() {
            tracing::warn!(
                owner = %owner,
                name = %name,
                expected_version = expected_version,
                "Version gate rejected write"
            );
        }

        Ok(applied)
    }

    /// Version-guarded write that reports a rejection as an error
    ///
    /// Returns `VersionConflict` with the stored version, or `NotFound` if the
    /// document no longer exists. The lookup after a rejection is only for
    /// reporting; the outcome was already decided by the guarded write.
    pub async fn write(
        &self,
        owner: &str,
        name: &str,
        content: &Value,
        expected_version: i64,
    ) -> StoreResult<Document> {
        if let Some(document) = self
            .try_write(owner, name, content, expected_version)
            .await?
        {
            return Ok(document);
        }

        match self.repo.find(owner, name).await? {
            Some(current) => Err(StoreError::VersionConflict {
                name: name.to_string(),
                expected: expected_version,
                actual: current.version,
            }),
            None => Err(StoreError::not_found(owner, name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;
    use crate::db::testing::{file_pool, memory_pool};

    #[tokio::test]
    async fn test_write_with_current_version() {
        let pool = memory_pool().await;
        let clock = ManualClock::at_millis(1_000);
        let repo = DocumentRepository::new(&pool, &clock);
        let gate = VersionGate::new(repo);

        repo.create("u1", "notes", &json!(1)).await.unwrap();
        let written = gate.write("u1", "notes", &json!(2), 1).await.unwrap();
        assert_eq!(written.version, 2);

        let written = gate.write("u1", "notes", &json!(3), 2).await.unwrap();
        assert_eq!(written.version, 3);
        assert_eq!(written.content, json!(3));
    }

    #[tokio::test]
    async fn test_stale_write_reports_stored_version() {
        let pool = memory_pool().await;
        let clock = ManualClock::at_millis(1_000);
        let repo = DocumentRepository::new(&pool, &clock);
        let gate = VersionGate::new(repo);

        repo.create("u1", "notes", &json!(1)).await.unwrap();
        gate.write("u1", "notes", &json!(2), 1).await.unwrap();

        let err = gate.write("u1", "notes", &json!(3), 1).await.unwrap_err();
        match err {
            StoreError::VersionConflict { expected, actual, .. } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("expected version conflict, got {:?}", other),
        }
        assert!(gate.try_write("u1", "notes", &json!(3), 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_to_missing_document() {
        let pool = memory_pool().await;
        let clock = ManualClock::at_millis(1_000);
        let gate = VersionGate::new(DocumentRepository::new(&pool, &clock));

        let err = gate.write("u1", "missing", &json!(1), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_contending_writers_one_success() {
        let dir = tempfile::tempdir().unwrap();
        let pool = file_pool(&dir).await;
        let clock = Arc::new(ManualClock::at_millis(1_000));

        DocumentRepository::new(&pool, clock.as_ref())
            .create("u1", "notes", &json!({"n": 0}))
            .await
            .unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..5 {
            let pool = pool.clone();
            let clock = clock.clone();
            tasks.spawn(async move {
                VersionGate::new(DocumentRepository::new(&pool, clock.as_ref()))
                    .write("u1", "notes", &json!({"n": i}), 1)
                    .await
            });
        }

        let mut successes = 0;
        let mut conflicts = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(document) => {
                    assert_eq!(document.version, 2);
                    successes += 1;
                }
                Err(StoreError::VersionConflict { actual, .. }) => {
                    assert_eq!(actual, 2);
                    conflicts += 1;
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 4);
    }
}
