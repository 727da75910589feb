//! Study-session state machines.
//!
//! Controllers are synchronous and perform no I/O. Every transition returns
//! the effects the caller must execute against its stores; a controller
//! dropped before completion has emitted no session summary, so abandoned
//! runs leave no trace beyond the per-answer progress writes already
//! handed out.

mod flashcard;
mod multiple_choice;

pub use flashcard::{FlashcardSession, RateOutcome};
pub use multiple_choice::{AnswerOutcome, MultipleChoiceSession};

use crate::types::{Card, CardProgress, StudySession};

/// A persistence command emitted by a transition. Execution is the
/// caller's job and must never block the learner's next card.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Upsert one per-card progress record, keyed `(user_id, card_id)`.
    SaveProgress(CardProgress),
    /// Append the summary of a completed run. Emitted exactly once, by the
    /// terminal transition.
    SaveSession(StudySession),
}

/// What the learner sees after a scored transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    /// Another card to study.
    Next { card: Card, review_pass: bool },
    /// The run is over.
    Completed(Box<StudySession>),
}
