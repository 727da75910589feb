//! Mastery tiers derived from answer streaks.
//!
//! Display-only: tiers never feed interval computation.

use serde::{Deserialize, Serialize};

/// Coarse skill tier for a single card, shown to the learner alongside
/// answer feedback and progress listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTier {
    Beginner,
    Intermediate,
    Advanced,
    Master,
}

impl MasteryTier {
    /// Classify a streak of consecutive correct answers.
    pub fn classify(consecutive_successes: u32) -> Self {
        match consecutive_successes {
            n if n >= 10 => Self::Master,
            n if n >= 7 => Self::Advanced,
            n if n >= 4 => Self::Intermediate,
            _ => Self::Beginner,
        }
    }

    /// Get the tier name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Master => "master",
        }
    }
}
