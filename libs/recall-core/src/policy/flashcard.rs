//! Interval policy for self-rated flashcard reviews.

use super::{MAX_INTERVAL_HOURS, MIN_INTERVAL_HOURS};
use crate::error::PolicyError;
use crate::types::Rating;

/// Flashcard policy with configurable multipliers.
#[derive(Debug, Clone)]
pub struct FlashcardPolicy {
    pub hard_multiplier: f64,
    pub normal_multiplier: f64,
    pub easy_multiplier: f64,
    pub min_interval_hours: f64,
    pub max_interval_hours: f64,
}

impl Default for FlashcardPolicy {
    fn default() -> Self {
        Self {
            hard_multiplier: 1.2,
            normal_multiplier: 2.0,
            easy_multiplier: 3.0,
            min_interval_hours: MIN_INTERVAL_HOURS,
            max_interval_hours: MAX_INTERVAL_HOURS,
        }
    }
}

impl FlashcardPolicy {
    /// Compute the next interval from the current one and the learner's
    /// rating. `Again` collapses to the minimum regardless of the current
    /// interval; the other ratings scale it by their multiplier, clamped
    /// into the policy bounds.
    pub fn apply(&self, interval_hours: f64, rating: Rating) -> Result<f64, PolicyError> {
        if !interval_hours.is_finite() || interval_hours < 0.0 {
            return Err(PolicyError::InvalidInterval(interval_hours));
        }

        let multiplier = match rating {
            Rating::Again => return Ok(self.min_interval_hours),
            Rating::Hard => self.hard_multiplier,
            Rating::Normal => self.normal_multiplier,
            Rating::Easy => self.easy_multiplier,
        };

        Ok((interval_hours.max(self.min_interval_hours) * multiplier)
            .clamp(self.min_interval_hours, self.max_interval_hours))
    }
}
