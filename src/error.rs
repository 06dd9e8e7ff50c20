//! Error types for the DailyUse sync server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type for document store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by the document store and the layers built on it.
///
/// Sync conflicts and no-ops are not errors; see [`crate::sync::SyncOutcome`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {name}")]
    NotFound { owner: String, name: String },

    #[error("document already exists: {name}")]
    AlreadyExists { owner: String, name: String },

    /// The version-guarded write did not match the stored version.
    #[error("version conflict on {name}: expected {expected}, stored {actual}")]
    VersionConflict {
        name: String,
        expected: i64,
        actual: i64,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The storage call failed or timed out. Its effects are unknown.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    #[error("content serialization error: {0}")]
    Content(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(owner: &str, name: &str) -> Self {
        StoreError::NotFound {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn already_exists(owner: &str, name: &str) -> Self {
        StoreError::AlreadyExists {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Whether the caller may retry after re-fetching the current record.
    ///
    /// The store never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. } | StoreError::StorageUnavailable(_)
        )
    }
}

/// HTTP-facing application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Store(e) => match e {
                StoreError::NotFound { name, .. } => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("Document not found: {}", name),
                ),
                StoreError::AlreadyExists { name, .. } => (
                    StatusCode::CONFLICT,
                    "already_exists",
                    format!("Document already exists: {}", name),
                ),
                StoreError::VersionConflict { .. } => {
                    (StatusCode::CONFLICT, "version_conflict", e.to_string())
                }
                StoreError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
                }
                StoreError::StorageUnavailable(err) => {
                    tracing::error!("Storage error: {}", err);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "storage_unavailable",
                        "Storage unavailable".to_string(),
                    )
                }
                StoreError::Content(err) => {
                    tracing::error!("Content error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "content_error",
                        "Failed to process document content".to_string(),
                    )
                }
            },
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
