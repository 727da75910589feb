//! In-memory registry of live study runs and fire-and-forget persistence.
//!
//! One learner drives one run at a time; a transition mutates the state
//! machine under the registry lock and nothing awaits while holding it.
//! Persistence effects go through a per-run channel to a worker task, so
//! writes for a card land in the order its transitions produced them while
//! the next card is never blocked on a store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use recall_core::session::{Effect, FlashcardSession, MultipleChoiceSession};
use recall_core::types::{Card, DeckId, SessionId, StudyMode, UserId};

use crate::store::{ProgressStore, SessionStore};

/// How long one store write may take before it is counted as failed.
const STORE_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// A live run in either study mode.
#[derive(Debug)]
pub enum StudyRun {
    MultipleChoice(MultipleChoiceSession),
    Flashcard(FlashcardSession),
}

impl StudyRun {
    pub fn id(&self) -> SessionId {
        match self {
            StudyRun::MultipleChoice(session) => session.id(),
            StudyRun::Flashcard(session) => session.id(),
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            StudyRun::MultipleChoice(session) => session.user_id(),
            StudyRun::Flashcard(session) => session.user_id(),
        }
    }

    pub fn deck_id(&self) -> DeckId {
        match self {
            StudyRun::MultipleChoice(session) => session.deck_id(),
            StudyRun::Flashcard(session) => session.deck_id(),
        }
    }

    pub fn study_mode(&self) -> StudyMode {
        match self {
            StudyRun::MultipleChoice(_) => StudyMode::MultipleChoice,
            StudyRun::Flashcard(_) => StudyMode::Flashcard,
        }
    }

    pub fn total_questions(&self) -> usize {
        match self {
            StudyRun::MultipleChoice(session) => session.total_questions(),
            StudyRun::Flashcard(session) => session.total_questions(),
        }
    }

    pub fn position(&self) -> usize {
        match self {
            StudyRun::MultipleChoice(session) => session.position(),
            StudyRun::Flashcard(session) => session.position(),
        }
    }

    /// Cards in the pass being walked. For flashcard runs there is only
    /// ever the single full pass.
    pub fn pass_size(&self) -> usize {
        match self {
            StudyRun::MultipleChoice(session) => session.pass_size(),
            StudyRun::Flashcard(session) => session.total_questions(),
        }
    }

    pub fn is_review_pass(&self) -> bool {
        match self {
            StudyRun::MultipleChoice(session) => session.is_review_pass(),
            StudyRun::Flashcard(_) => false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        match self {
            StudyRun::MultipleChoice(_) => false,
            StudyRun::Flashcard(session) => session.is_revealed(),
        }
    }

    pub fn is_completed(&self) -> bool {
        match self {
            StudyRun::MultipleChoice(session) => session.is_completed(),
            StudyRun::Flashcard(session) => session.is_completed(),
        }
    }

    pub fn current_card(&self) -> Option<&Card> {
        match self {
            StudyRun::MultipleChoice(session) => session.current_card(),
            StudyRun::Flashcard(session) => session.current_card(),
        }
    }
}

struct RunEntry {
    run: StudyRun,
    warnings: Arc<AtomicU32>,
    effects_tx: mpsc::UnboundedSender<Effect>,
}

/// Registry of live runs keyed by session id.
pub struct SessionRegistry {
    progress_store: Arc<dyn ProgressStore>,
    session_store: Arc<dyn SessionStore>,
    runs: Mutex<HashMap<SessionId, RunEntry>>,
}

impl SessionRegistry {
    pub fn new(
        progress_store: Arc<dyn ProgressStore>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            progress_store,
            session_store,
            runs: Mutex::new(HashMap::new()),
        }
    }

    /// Register a run and spawn its effect worker.
    pub fn insert(&self, run: StudyRun) -> SessionId {
        let id = run.id();
        let warnings = Arc::new(AtomicU32::new(0));
        let (effects_tx, effects_rx) = mpsc::unbounded_channel();

        tokio::spawn(drain_effects(
            effects_rx,
            self.progress_store.clone(),
            self.session_store.clone(),
            warnings.clone(),
        ));

        let mut runs = self.runs.lock().expect("session registry lock poisoned");
        runs.insert(
            id,
            RunEntry {
                run,
                warnings,
                effects_tx,
            },
        );
        id
    }

    /// Run `f` over a live entry owned by `user_id`. Returns `None` when
    /// the session does not exist or belongs to another learner. The
    /// closure runs under the registry lock and must not block; effects it
    /// sends are executed in order by the run's worker.
    pub fn with_entry<T>(
        &self,
        id: SessionId,
        user_id: UserId,
        f: impl FnOnce(&mut StudyRun, &AtomicU32, &mpsc::UnboundedSender<Effect>) -> T,
    ) -> Option<T> {
        let mut runs = self.runs.lock().expect("session registry lock poisoned");
        let entry = runs.get_mut(&id)?;
        if entry.run.user_id() != user_id {
            return None;
        }
        Some(f(&mut entry.run, &entry.warnings, &entry.effects_tx))
    }

    /// Drop a run from the registry. Effects already queued still flush:
    /// dropping the sender lets the worker drain and exit.
    pub fn remove(&self, id: SessionId, user_id: UserId) -> bool {
        let mut runs = self.runs.lock().expect("session registry lock poisoned");
        match runs.get(&id) {
            Some(entry) if entry.run.user_id() == user_id => {
                runs.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Number of live runs.
    pub fn len(&self) -> usize {
        self.runs.lock().expect("session registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Execute a run's effects in order. Failures and timeouts are logged and
/// counted against the run; they never propagate back into the session.
async fn drain_effects(
    mut effects_rx: mpsc::UnboundedReceiver<Effect>,
    progress_store: Arc<dyn ProgressStore>,
    session_store: Arc<dyn SessionStore>,
    warnings: Arc<AtomicU32>,
) {
    while let Some(effect) = effects_rx.recv().await {
        let (label, result) = match &effect {
            Effect::SaveProgress(progress) => (
                "card progress",
                timeout(STORE_WRITE_TIMEOUT, progress_store.put(progress)).await,
            ),
            Effect::SaveSession(session) => (
                "session summary",
                timeout(STORE_WRITE_TIMEOUT, session_store.put(session)).await,
            ),
        };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warnings.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Failed to save {}: {}", label, err);
            }
            Err(_) => {
                warnings.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Timed out saving {} after {:?}",
                    label,
                    STORE_WRITE_TIMEOUT
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recall_core::policy::MultipleChoicePolicy;
    use recall_core::types::{CardContent, CardProgress};
    use uuid::Uuid;

    use crate::store::MemoryStore;

    fn sample_card(deck_id: DeckId) -> Card {
        Card {
            id: Uuid::new_v4(),
            deck_id,
            prompt: "2 + 2?".to_string(),
            content: CardContent::MultipleChoice {
                options: vec!["3".to_string(), "4".to_string()],
                correct_index: 1,
            },
        }
    }

    fn sample_run(user_id: UserId, deck_id: DeckId) -> StudyRun {
        let session = MultipleChoiceSession::start(
            MultipleChoicePolicy::default(),
            user_id,
            deck_id,
            vec![sample_card(deck_id)],
            vec![],
            Utc::now(),
        )
        .unwrap();
        StudyRun::MultipleChoice(session)
    }

    fn registry_over(store: &Arc<MemoryStore>) -> SessionRegistry {
        SessionRegistry::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_with_entry_checks_ownership() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);
        let user_id = Uuid::new_v4();
        let id = registry.insert(sample_run(user_id, Uuid::new_v4()));

        assert!(registry
            .with_entry(id, user_id, |run, _, _| run.id())
            .is_some());
        assert!(registry
            .with_entry(id, Uuid::new_v4(), |run, _, _| run.id())
            .is_none());
        assert!(registry
            .with_entry(Uuid::new_v4(), user_id, |run, _, _| run.id())
            .is_none());
    }

    #[tokio::test]
    async fn test_remove_checks_ownership() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);
        let user_id = Uuid::new_v4();
        let id = registry.insert(sample_run(user_id, Uuid::new_v4()));

        assert!(!registry.remove(id, Uuid::new_v4()));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(id, user_id));
        assert!(registry.is_empty());
        assert!(!registry.remove(id, user_id));
    }

    #[tokio::test]
    async fn test_queued_effects_reach_the_stores() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);
        let user_id = Uuid::new_v4();
        let deck_id = Uuid::new_v4();
        let id = registry.insert(sample_run(user_id, deck_id));

        let card_id = Uuid::new_v4();
        registry
            .with_entry(id, user_id, |_, _, effects| {
                let progress = CardProgress::new(
                    card_id,
                    deck_id,
                    user_id,
                    StudyMode::MultipleChoice,
                    Utc::now(),
                );
                effects.send(Effect::SaveProgress(progress)).unwrap();
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.progress_for(user_id, card_id).is_some());
    }

    #[tokio::test]
    async fn test_effects_queued_before_removal_still_flush() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);
        let user_id = Uuid::new_v4();
        let deck_id = Uuid::new_v4();
        let id = registry.insert(sample_run(user_id, deck_id));

        let card_id = Uuid::new_v4();
        registry
            .with_entry(id, user_id, |_, _, effects| {
                let progress = CardProgress::new(
                    card_id,
                    deck_id,
                    user_id,
                    StudyMode::MultipleChoice,
                    Utc::now(),
                );
                effects.send(Effect::SaveProgress(progress)).unwrap();
            })
            .unwrap();
        registry.remove(id, user_id);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.progress_for(user_id, card_id).is_some());
    }

    #[tokio::test]
    async fn test_failed_writes_count_warnings() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let registry = registry_over(&store);
        let user_id = Uuid::new_v4();
        let deck_id = Uuid::new_v4();
        let id = registry.insert(sample_run(user_id, deck_id));

        registry
            .with_entry(id, user_id, |_, _, effects| {
                let progress = CardProgress::new(
                    Uuid::new_v4(),
                    deck_id,
                    user_id,
                    StudyMode::MultipleChoice,
                    Utc::now(),
                );
                effects.send(Effect::SaveProgress(progress)).unwrap();
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        let warnings = registry
            .with_entry(id, user_id, |_, warnings, _| {
                warnings.load(Ordering::Relaxed)
            })
            .unwrap();
        assert_eq!(warnings, 1);
        assert_eq!(store.progress_count(), 0);
    }
}
