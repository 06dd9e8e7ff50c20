//! Timestamp-based sync resolution
//!
//! Decides, for one (owner, name), whether a client edit is applied,
//! rejected in favor of the server copy, or already in sync.

use std::cmp::Ordering;

use serde_json::Value;

use super::gate::VersionGate;
use super::types::{SyncConflict, SyncOutcome};
use crate::db::DocumentRepository;
use crate::error::{StoreError, StoreResult};

/// Sync resolver built on the record store and version gate
#[derive(Clone, Copy)]
pub struct SyncResolver<'a> {
    repo: DocumentRepository<'a>,
    gate: VersionGate<'a>,
}

impl<'a> SyncResolver<'a> {
    pub fn new(repo: DocumentRepository<'a>) -> Self {
        Self {
            repo,
            gate: VersionGate::new(repo),
        }
    }

    /// Reconcile a client document against the stored copy
    ///
    /// `client_timestamp` is the `lastModified` (epoch ms) the client last
    /// saw, compared as-is with the stored value. Storage errors abort the
    /// resolution; no step is retried here.
    pub async fn synchronize(
        &self,
        owner: &str,
        name: &str,
        content: &Value,
        client_timestamp: i64,
    ) -> StoreResult<SyncOutcome> {
        let existing = match self.repo.find(owner, name).await? {
            Some(existing) => existing,
            None => {
                return match self.repo.create(owner, name, content).await {
                    Ok(document) => Ok(SyncOutcome::Created(document)),
                    Err(StoreError::AlreadyExists { .. }) => {
                        tracing::warn!(
                            owner = %owner,
                            name = %name,
                            "Concurrent create won the race"
                        );
                        Ok(SyncOutcome::Conflict(SyncConflict::LostRace {
                            observed_version: None,
                        }))
                    }
                    Err(e) => Err(e),
                };
            }
        };

        let server_timestamp = existing.last_modified_millis();

        tracing::debug!(
            owner = %owner,
            name = %name,
            client_timestamp = client_timestamp,
            server_timestamp = server_timestamp,
            version = existing.version,
            "Resolving sync"
        );

        match client_timestamp.cmp(&server_timestamp) {
            Ordering::Greater => {
                let observed_version = existing.version;
                match self
                    .gate
                    .try_write(owner, name, content, observed_version)
                    .await?
                {
                    Some(document) => Ok(SyncOutcome::Updated(document)),
                    None => Ok(SyncOutcome::Conflict(SyncConflict::LostRace {
                        observed_version: Some(observed_version),
                    })),
                }
            }
            Ordering::Less => Ok(SyncOutcome::Conflict(SyncConflict::ServerNewer(existing))),
            Ordering::Equal => Ok(SyncOutcome::NoOp),
        }
    }
}
