//! Sync API endpoints
//!
//! Timestamp-based synchronization of a single document.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::identity::Owner;
use crate::state::AppState;
use crate::sync::{SyncOutcome, SyncRequest, SyncResponse};

/// Create the sync router
pub fn router() -> Router<AppState> {
    Router::new().route("/:name", post(sync_document))
}

/// Reconcile a client copy with the server copy
async fn sync_document(
    State(state): State<AppState>,
    owner: Owner,
    Path(name): Path<String>,
    Json(req): Json<SyncRequest>,
) -> Result<(StatusCode, Json<SyncResponse>)> {
    let outcome = state
        .documents()
        .synchronize(owner.as_str(), &name, &req.content, req.client_timestamp)
        .await?;

    let status = match &outcome {
        SyncOutcome::Created(_) => StatusCode::CREATED,
        SyncOutcome::Updated(_) | SyncOutcome::NoOp => StatusCode::OK,
        SyncOutcome::Conflict(_) => StatusCode::CONFLICT,
    };

    Ok((status, Json(SyncResponse::from(outcome))))
}
