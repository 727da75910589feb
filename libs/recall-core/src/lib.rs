//! Core study library shared by the backend service.
//!
//! Provides:
//! - Interval policies for both study modes (multiple-choice, flashcard)
//! - Mastery tier classification from answer streaks
//! - Review scheduling (queue ordering, due checks, interval stamping)
//! - Session state machines that emit persistence effects
//! - Shared types (Card, CardProgress, StudySession, etc.)
//!
//! Everything here is synchronous and side-effect free: controllers hand
//! persistence commands back to the caller instead of touching storage.

pub mod error;
pub mod mastery;
pub mod policy;
pub mod scheduler;
pub mod session;
pub mod types;

pub use error::{PolicyError, Result, SessionError, TransitionError};
pub use mastery::MasteryTier;
pub use policy::{
    ChoiceState, FlashcardPolicy, MultipleChoicePolicy, MAX_INTERVAL_HOURS, MIN_INTERVAL_HOURS,
};
pub use session::{
    AnswerOutcome, Effect, FlashcardSession, MultipleChoiceSession, RateOutcome, SessionStep,
};
pub use types::{
    Card, CardContent, CardId, CardProgress, DeckId, QuestionStats, Rating, RatingBreakdown,
    RatingEntry, RatingTally, SessionId, SessionResults, StudyMode, StudySession, UserId,
};
