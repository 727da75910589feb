//! In-memory store adapters.
//!
//! Default backend when no database is configured, and the backend the
//! integration tests run against. Writes can be forced to fail to exercise
//! the best-effort persistence path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use recall_core::types::{CardId, CardProgress, DeckId, StudySession, UserId};

use super::{ProgressStore, SessionStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    progress: Mutex<HashMap<(UserId, CardId), CardProgress>>,
    sessions: Mutex<Vec<StudySession>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail. Reads are unaffected.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of progress records across all learners.
    pub fn progress_count(&self) -> usize {
        self.progress.lock().expect("progress lock poisoned").len()
    }

    /// The stored progress record for one learner and card.
    pub fn progress_for(&self, user_id: UserId, card_id: CardId) -> Option<CardProgress> {
        self.progress
            .lock()
            .expect("progress lock poisoned")
            .get(&(user_id, card_id))
            .cloned()
    }

    /// All recorded session summaries, oldest first.
    pub fn sessions(&self) -> Vec<StudySession> {
        self.sessions.lock().expect("sessions lock poisoned").clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get(
        &self,
        user_id: UserId,
        deck_id: DeckId,
    ) -> Result<Vec<CardProgress>, StoreError> {
        let progress = self.progress.lock().expect("progress lock poisoned");
        Ok(progress
            .values()
            .filter(|p| p.user_id == user_id && p.deck_id == deck_id)
            .cloned()
            .collect())
    }

    async fn put(&self, progress: &CardProgress) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut records = self.progress.lock().expect("progress lock poisoned");
        records.insert((progress.user_id, progress.card_id), progress.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put(&self, session: &StudySession) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut sessions = self.sessions.lock().expect("sessions lock poisoned");
        sessions.push(session.clone());
        Ok(())
    }
}
