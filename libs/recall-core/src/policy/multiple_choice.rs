//! Interval policy for multiple-choice reviews.
//!
//! Geometric growth damped by the card's lifetime error rate: cards the
//! learner keeps getting wrong grow their intervals slowly even once the
//! answers turn correct.

use serde::{Deserialize, Serialize};

use super::{MAX_INTERVAL_HOURS, MIN_INTERVAL_HOURS};
use crate::error::PolicyError;

/// The slice of progress state the multiple-choice policy reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChoiceState {
    pub interval_hours: f64,
    pub consecutive_successes: u32,
    pub total_errors: u32,
    pub total_attempts: u32,
}

/// Multiple-choice policy with configurable parameters.
#[derive(Debug, Clone)]
pub struct MultipleChoicePolicy {
    pub base_growth: f64,
    pub growth_floor: f64,
    pub error_weight: f64,
    pub min_interval_hours: f64,
    pub max_interval_hours: f64,
}

impl Default for MultipleChoicePolicy {
    fn default() -> Self {
        Self {
            base_growth: 2.5,
            growth_floor: 1.3,
            error_weight: 3.0,
            min_interval_hours: MIN_INTERVAL_HOURS,
            max_interval_hours: MAX_INTERVAL_HOURS,
        }
    }
}

impl MultipleChoicePolicy {
    /// Score one answer and produce the next scheduling state.
    ///
    /// A correct answer multiplies the interval by a growth factor that
    /// shrinks toward `growth_floor` as the lifetime error rate rises. A
    /// wrong answer collapses the interval to the minimum and resets the
    /// streak. The attempt counter increments before the error rate is
    /// computed, so the rate is always well defined.
    pub fn apply(&self, state: ChoiceState, correct: bool) -> Result<ChoiceState, PolicyError> {
        if !state.interval_hours.is_finite() || state.interval_hours < 0.0 {
            return Err(PolicyError::InvalidInterval(state.interval_hours));
        }
        if state.total_errors > state.total_attempts {
            return Err(PolicyError::CountersOutOfRange {
                errors: state.total_errors,
                attempts: state.total_attempts,
            });
        }

        let total_attempts = state.total_attempts + 1;

        if correct {
            let error_rate = f64::from(state.total_errors) / f64::from(total_attempts);
            let growth = (self.base_growth - self.error_weight * error_rate).max(self.growth_floor);
            let interval_hours = (state.interval_hours.max(self.min_interval_hours) * growth)
                .clamp(self.min_interval_hours, self.max_interval_hours);

            Ok(ChoiceState {
                interval_hours,
                consecutive_successes: state.consecutive_successes + 1,
                total_errors: state.total_errors,
                total_attempts,
            })
        } else {
            Ok(ChoiceState {
                interval_hours: self.min_interval_hours,
                consecutive_successes: 0,
                total_errors: state.total_errors + 1,
                total_attempts,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ChoiceState {
        ChoiceState {
            interval_hours: 0.0,
            consecutive_successes: 0,
            total_errors: 0,
            total_attempts: 0,
        }
    }

    #[test]
    fn first_correct_answer_grows_from_minimum() {
        let policy = MultipleChoicePolicy::default();
        let next = policy.apply(fresh(), true).unwrap();
        assert_eq!(next.interval_hours, 2.5);
        assert_eq!(next.consecutive_successes, 1);
        assert_eq!(next.total_attempts, 1);
        assert_eq!(next.total_errors, 0);
    }

    #[test]
    fn interval_grows_monotonically_while_correct() {
        let policy = MultipleChoicePolicy::default();
        let mut state = fresh();
        let mut previous = 0.0;
        for _ in 0..6 {
            state = policy.apply(state, true).unwrap();
            assert!(state.interval_hours > previous);
            previous = state.interval_hours;
        }
        // No errors: full base growth each time.
        assert_eq!(state.consecutive_successes, 6);
        assert!((state.interval_hours - 2.5f64.powi(6)).abs() < 1e-9);
    }

    #[test]
    fn wrong_answer_collapses_interval_and_resets_streak() {
        let policy = MultipleChoicePolicy::default();
        let state = ChoiceState {
            interval_hours: 100.0,
            consecutive_successes: 5,
            total_errors: 0,
            total_attempts: 5,
        };
        let next = policy.apply(state, false).unwrap();
        assert_eq!(next.interval_hours, policy.min_interval_hours);
        assert_eq!(next.consecutive_successes, 0);
        assert_eq!(next.total_errors, 1);
        assert_eq!(next.total_attempts, 6);
    }

    #[test]
    fn high_error_rate_damps_growth_to_floor() {
        let policy = MultipleChoicePolicy::default();
        // 3 errors in 5 attempts: rate after this answer is 0.5, so the
        // raw growth 2.5 - 3.0 * 0.5 = 1.0 sits below the 1.3 floor.
        let state = ChoiceState {
            interval_hours: 10.0,
            consecutive_successes: 1,
            total_errors: 3,
            total_attempts: 5,
        };
        let next = policy.apply(state, true).unwrap();
        assert!((next.interval_hours - 13.0).abs() < 1e-9);
    }

    #[test]
    fn moderate_error_rate_damps_growth_partially() {
        let policy = MultipleChoicePolicy::default();
        // 1 error in 9 attempts: rate 0.1, growth 2.5 - 0.3 = 2.2.
        let state = ChoiceState {
            interval_hours: 10.0,
            consecutive_successes: 4,
            total_errors: 1,
            total_attempts: 9,
        };
        let next = policy.apply(state, true).unwrap();
        assert!((next.interval_hours - 22.0).abs() < 1e-9);
    }

    #[test]
    fn interval_never_exceeds_maximum() {
        let policy = MultipleChoicePolicy::default();
        let state = ChoiceState {
            interval_hours: 4000.0,
            consecutive_successes: 12,
            total_errors: 0,
            total_attempts: 12,
        };
        let next = policy.apply(state, true).unwrap();
        assert_eq!(next.interval_hours, policy.max_interval_hours);
    }

    #[test]
    fn rejects_non_finite_interval() {
        let policy = MultipleChoicePolicy::default();
        let mut state = fresh();
        state.interval_hours = f64::NAN;
        assert!(matches!(
            policy.apply(state, true),
            Err(PolicyError::InvalidInterval(_))
        ));
        state.interval_hours = -1.0;
        assert!(matches!(
            policy.apply(state, true),
            Err(PolicyError::InvalidInterval(_))
        ));
    }

    #[test]
    fn rejects_counters_out_of_range() {
        let policy = MultipleChoicePolicy::default();
        let state = ChoiceState {
            interval_hours: 1.0,
            consecutive_successes: 0,
            total_errors: 3,
            total_attempts: 2,
        };
        assert_eq!(
            policy.apply(state, true),
            Err(PolicyError::CountersOutOfRange {
                errors: 3,
                attempts: 2
            })
        );
    }
}
