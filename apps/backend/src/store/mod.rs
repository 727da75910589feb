//! Store contracts for the scheduling core's two collaborators.
//!
//! The backend persists through these narrow traits; schemas and transports
//! live behind them. During a run every write is best-effort from the
//! session's perspective: callers log failures and keep the learner moving.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use thiserror::Error;

use recall_core::types::{CardProgress, DeckId, StudySession, UserId};

/// Store failure surfaced to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("could not encode record: {0}")]
    Encoding(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Per-learner scheduling state, keyed by `(user_id, card_id)`.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All progress records the learner has for a deck.
    async fn get(&self, user_id: UserId, deck_id: DeckId)
        -> Result<Vec<CardProgress>, StoreError>;

    /// Idempotent upsert of one record.
    async fn put(&self, progress: &CardProgress) -> Result<(), StoreError>;
}

/// Append-only log of completed study runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record one completed run. Called exactly once per run by the
    /// session controller's terminal transition.
    async fn put(&self, session: &StudySession) -> Result<(), StoreError>;
}
