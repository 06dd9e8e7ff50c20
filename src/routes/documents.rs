//! Document CRUD API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::db::Document;
use crate::error::Result;
use crate::identity::Owner;
use crate::state::AppState;

/// Create document request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub name: String,
    pub content: Value,
}

/// Update document request
///
/// Without `version` the write targets whatever version is current (upsert).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDocument {
    pub content: Value,
    pub version: Option<i64>,
}

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_documents)
                .post(create_document)
                .delete(delete_all_documents),
        )
        .route(
            "/:name",
            get(get_document)
                .put(update_document)
                .delete(delete_document),
        )
}

/// List the caller's documents
async fn list_documents(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<Document>>> {
    let documents = state.documents().list(owner.as_str()).await?;
    Ok(Json(documents))
}

/// Create a new document
async fn create_document(
    State(state): State<AppState>,
    owner: Owner,
    Json(data): Json<CreateDocument>,
) -> Result<(StatusCode, Json<Document>)> {
    let document = state
        .documents()
        .create(owner.as_str(), &data.name, &data.content)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Get a specific document
async fn get_document(
    State(state): State<AppState>,
    owner: Owner,
    Path(name): Path<String>,
) -> Result<Json<Document>> {
    let document = state.documents().get(owner.as_str(), &name).await?;
    Ok(Json(document))
}

/// Update a document, version-gated when a version is supplied
async fn update_document(
    State(state): State<AppState>,
    owner: Owner,
    Path(name): Path<String>,
    Json(data): Json<UpdateDocument>,
) -> Result<Json<Document>> {
    let documents = state.documents();
    let document = match data.version {
        Some(version) => {
            documents
                .update(owner.as_str(), &name, &data.content, version)
                .await?
        }
        None => documents.upsert(owner.as_str(), &name, &data.content).await?,
    };
    Ok(Json(document))
}

/// Delete a document
async fn delete_document(
    State(state): State<AppState>,
    owner: Owner,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    state.documents().delete(owner.as_str(), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete all of the caller's documents
async fn delete_all_documents(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Value>> {
    let deleted = state.documents().delete_all(owner.as_str()).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
