//! Common test utilities and fixtures for integration tests.
//!
//! Tests run against the in-memory stores, so no database or other
//! external service is required. The `store` handle on the context lets
//! tests inspect what the run persisted and force write failures.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use recall_backend::services::sessions::SessionRegistry;
use recall_backend::store::{MemoryStore, ProgressStore, SessionStore};
use recall_backend::{router, AppState};

/// Test context wiring the full router to in-memory stores.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let progress_store: Arc<dyn ProgressStore> = store.clone();
        let session_store: Arc<dyn SessionStore> = store.clone();

        let registry = Arc::new(SessionRegistry::new(
            progress_store.clone(),
            session_store.clone(),
        ));
        let state = AppState {
            progress_store,
            session_store,
            registry,
        };

        let app = router(state);

        Self { store, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// A fresh learner id for the x-user-id header.
    pub fn user() -> Uuid {
        Uuid::new_v4()
    }

    /// Seed a progress record directly into the store.
    pub async fn seed_progress(&self, progress: &recall_backend::models::CardProgress) {
        ProgressStore::put(self.store.as_ref(), progress)
            .await
            .expect("Failed to seed progress");
    }
}
