//! Sync data types

use serde::{Deserialize, Serialize};

use crate::db::Document;

/// Result of reconciling a client document against the server copy
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// No server copy existed; the client document was stored at version 1
    Created(Document),
    /// The client edit was newer and has been applied
    Updated(Document),
    /// Server and client diverge; nothing was written
    Conflict(SyncConflict),
    /// Client and server already agree
    NoOp,
}

impl SyncOutcome {
    pub fn status(&self) -> SyncStatus {
        match self {
            SyncOutcome::Created(_) => SyncStatus::Created,
            SyncOutcome::Updated(_) => SyncStatus::Updated,
            SyncOutcome::Conflict(_) => SyncStatus::Conflict,
            SyncOutcome::NoOp => SyncStatus::Noop,
        }
    }
}

/// Why a sync ended in conflict
#[derive(Debug, Clone, PartialEq)]
pub enum SyncConflict {
    /// The server copy is newer than the client's timestamp
    ServerNewer(Document),
    /// Another writer changed the document between our read and our write.
    /// Transient: re-fetch and resolve again.
    LostRace {
        /// Version we read, `None` if the document did not exist yet
        observed_version: Option<i64>,
    },
}

impl SyncConflict {
    /// Server snapshot to hand back to the client, if one was read
    pub fn server_document(&self) -> Option<&Document> {
        match self {
            SyncConflict::ServerNewer(document) => Some(document),
            SyncConflict::LostRace { .. } => None,
        }
    }
}

/// Wire status of a sync outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Created,
    Updated,
    Conflict,
    Noop,
}

/// Request to synchronize one document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Client document content
    pub content: serde_json::Value,
    /// Client's last-known modification time, epoch milliseconds
    pub client_timestamp: i64,
}

/// Response from a sync operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub status: SyncStatus,
    /// Stored document after an accepted write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    /// Server copy the client should reconcile against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_data: Option<Document>,
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        let status = outcome.status();
        match outcome {
            SyncOutcome::Created(document) | SyncOutcome::Updated(document) => SyncResponse {
                status,
                document: Some(document),
                server_data: None,
            },
            SyncOutcome::Conflict(conflict) => SyncResponse {
                status,
                document: None,
                server_data: conflict.server_document().cloned(),
            },
            SyncOutcome::NoOp => SyncResponse {
                status,
                document: None,
                server_data: None,
            },
        }
    }
}
