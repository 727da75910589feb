//! Error types for recall-core.

use thiserror::Error;

use crate::types::{CardId, StudyMode};

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Invalid input handed to an interval policy. Policies fail fast instead
/// of propagating NaN or corrupt counters into stored intervals.
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("interval must be finite and non-negative, got {0}")]
    InvalidInterval(f64),

    #[error("error count {errors} exceeds attempt count {attempts}")]
    CountersOutOfRange { errors: u32, attempts: u32 },
}

/// A session operation that is illegal in the current state. The session
/// is left unchanged and no effects are emitted.
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("session is already completed")]
    SessionCompleted,

    #[error("cannot start a session with an empty queue")]
    EmptyQueue,

    #[error("card {card_id} does not carry {expected} content")]
    ModeMismatch { card_id: CardId, expected: StudyMode },

    #[error("card {card_id} is invalid: {reason}")]
    InvalidCard { card_id: CardId, reason: String },

    #[error("selected option {selected} out of range for {available} options")]
    OptionOutOfRange { selected: usize, available: usize },

    #[error("card has not been revealed yet")]
    NotRevealed,

    #[error("card is already revealed")]
    AlreadyRevealed,
}

/// Any error a session controller can return.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}
