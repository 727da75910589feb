//! Interval policies for review scheduling.
//!
//! Both policies are pure: they compute the next interval from the current
//! one and the review outcome, and never read the clock. Callers stamp the
//! result onto progress records via [`crate::scheduler::stamp`].

mod flashcard;
mod multiple_choice;

pub use flashcard::FlashcardPolicy;
pub use multiple_choice::{ChoiceState, MultipleChoicePolicy};

/// Shortest interval a review can produce, in hours.
pub const MIN_INTERVAL_HOURS: f64 = 1.0;

/// Longest interval a review can produce, in hours (180 days).
pub const MAX_INTERVAL_HOURS: f64 = 24.0 * 180.0;
