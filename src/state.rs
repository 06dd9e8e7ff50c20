//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::config::Config;
use crate::service::DocumentService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    documents: DocumentService,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        let documents = DocumentService::new(db.clone(), clock);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                documents,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the document service
    pub fn documents(&self) -> &DocumentService {
        &self.inner.documents
    }

    /// Close the database pool, waiting for in-flight queries
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down application state...");
        self.inner.db.close().await;
    }
}
