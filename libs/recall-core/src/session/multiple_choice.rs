//! Multiple-choice session controller.
//!
//! Runs one pass over the queue, then a single review pass over the cards
//! missed in the first pass, in their original relative order. Cards
//! missed during the review pass are not queued again.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Effect, SessionStep};
use crate::error::{SessionError, TransitionError};
use crate::mastery::MasteryTier;
use crate::policy::{ChoiceState, MultipleChoicePolicy};
use crate::scheduler;
use crate::types::{
    Card, CardContent, CardId, CardProgress, DeckId, QuestionStats, SessionId, SessionResults,
    StudyMode, StudySession, UserId,
};

/// Feedback for one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_index: usize,
    pub streak: u32,
    pub mastery: MasteryTier,
    pub next_review: DateTime<Utc>,
    pub step: SessionStep,
    pub effects: Vec<Effect>,
}

/// State machine for one learner's multiple-choice run over a deck.
#[derive(Debug, Clone)]
pub struct MultipleChoiceSession {
    id: SessionId,
    user_id: UserId,
    deck_id: DeckId,
    policy: MultipleChoicePolicy,
    started_at: DateTime<Utc>,
    queue: Vec<Card>,
    review_queue: Vec<Card>,
    position: usize,
    review_pass: bool,
    progress: HashMap<CardId, CardProgress>,
    stats: Vec<QuestionStats>,
    hits: u32,
    misses: u32,
    completed: Option<StudySession>,
}

impl MultipleChoiceSession {
    /// Start a run over an ordered queue, seeded with the learner's prior
    /// progress for the deck. Every card must carry multiple-choice
    /// content with a valid answer key.
    pub fn start(
        policy: MultipleChoicePolicy,
        user_id: UserId,
        deck_id: DeckId,
        queue: Vec<Card>,
        prior_progress: Vec<CardProgress>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if queue.is_empty() {
            return Err(TransitionError::EmptyQueue.into());
        }
        for card in &queue {
            match &card.content {
                CardContent::MultipleChoice {
                    options,
                    correct_index,
                } => {
                    if options.is_empty() {
                        return Err(TransitionError::InvalidCard {
                            card_id: card.id,
                            reason: "no answer options".to_string(),
                        }
                        .into());
                    }
                    if *correct_index >= options.len() {
                        return Err(TransitionError::InvalidCard {
                            card_id: card.id,
                            reason: format!(
                                "correct index {} out of range for {} options",
                                correct_index,
                                options.len()
                            ),
                        }
                        .into());
                    }
                }
                CardContent::Flashcard { .. } => {
                    return Err(TransitionError::ModeMismatch {
                        card_id: card.id,
                        expected: StudyMode::MultipleChoice,
                    }
                    .into());
                }
            }
        }

        let progress = prior_progress
            .into_iter()
            .map(|p| (p.card_id, p))
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            deck_id,
            policy,
            started_at: now,
            queue,
            review_queue: Vec::new(),
            position: 0,
            review_pass: false,
            progress,
            stats: Vec::new(),
            hits: 0,
            misses: 0,
            completed: None,
        })
    }

    /// Score the selected option against the current card and advance.
    ///
    /// Guard failures leave the session untouched. A successful call emits
    /// a progress save for the card, plus the session save if this answer
    /// completed the run.
    pub fn submit_answer(
        &mut self,
        selected: usize,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        if self.completed.is_some() {
            return Err(TransitionError::SessionCompleted.into());
        }

        let card = self.active_queue()[self.position].clone();
        let (available, correct_index) = match &card.content {
            CardContent::MultipleChoice {
                options,
                correct_index,
            } => (options.len(), *correct_index),
            CardContent::Flashcard { .. } => {
                return Err(TransitionError::ModeMismatch {
                    card_id: card.id,
                    expected: StudyMode::MultipleChoice,
                }
                .into());
            }
        };
        if selected >= available {
            return Err(TransitionError::OptionOutOfRange {
                selected,
                available,
            }
            .into());
        }

        let correct = selected == correct_index;

        let mut record = self
            .progress
            .remove(&card.id)
            .unwrap_or_else(|| {
                CardProgress::new(card.id, self.deck_id, self.user_id, StudyMode::MultipleChoice, now)
            });
        let next = self.policy.apply(
            ChoiceState {
                interval_hours: record.interval_hours,
                consecutive_successes: record.consecutive_successes,
                total_errors: record.total_errors,
                total_attempts: record.total_attempts,
            },
            correct,
        )?;

        record.total_attempts = next.total_attempts;
        record.total_errors = next.total_errors;
        record.consecutive_successes = next.consecutive_successes;
        record.study_mode = StudyMode::MultipleChoice;
        scheduler::stamp(&mut record, next.interval_hours, now);

        if correct {
            self.hits += 1;
        } else {
            self.misses += 1;
            if !self.review_pass {
                self.review_queue.push(card.clone());
            }
        }
        self.record_stats(&card, correct);

        let streak = record.consecutive_successes;
        let next_review = record.next_review;
        let mut effects = vec![Effect::SaveProgress(record.clone())];
        self.progress.insert(card.id, record);

        let step = self.advance(now, &mut effects);

        Ok(AnswerOutcome {
            correct,
            correct_index,
            streak,
            mastery: MasteryTier::classify(streak),
            next_review,
            step,
            effects,
        })
    }

    fn record_stats(&mut self, card: &Card, correct: bool) {
        if let Some(entry) = self.stats.iter_mut().find(|s| s.card_id == card.id) {
            entry.attempts += 1;
            if !correct {
                entry.errors += 1;
            }
        } else {
            self.stats.push(QuestionStats {
                card_id: card.id,
                prompt: card.prompt.clone(),
                attempts: 1,
                errors: if correct { 0 } else { 1 },
            });
        }
    }

    /// Move to the next card, into the review pass, or to completion.
    fn advance(&mut self, now: DateTime<Utc>, effects: &mut Vec<Effect>) -> SessionStep {
        self.position += 1;
        if self.position < self.active_queue().len() {
            return SessionStep::Next {
                card: self.active_queue()[self.position].clone(),
                review_pass: self.review_pass,
            };
        }
        if !self.review_pass && !self.review_queue.is_empty() {
            self.review_pass = true;
            self.position = 0;
            return SessionStep::Next {
                card: self.review_queue[0].clone(),
                review_pass: true,
            };
        }

        let session = self.build_summary(now);
        self.completed = Some(session.clone());
        effects.push(Effect::SaveSession(session.clone()));
        SessionStep::Completed(Box::new(session))
    }

    fn build_summary(&self, now: DateTime<Utc>) -> StudySession {
        let mut questions = self.stats.clone();
        questions.sort_by(|a, b| b.errors.cmp(&a.errors));
        let total_questions = self.queue.len() as u32;

        StudySession {
            id: self.id,
            user_id: self.user_id,
            deck_id: self.deck_id,
            started_at: self.started_at,
            ended_at: now,
            total_questions,
            results: SessionResults::MultipleChoice {
                hits: self.hits,
                misses: self.misses,
                accuracy: f64::from(self.hits) / f64::from(total_questions),
                questions,
            },
        }
    }

    fn active_queue(&self) -> &[Card] {
        if self.review_pass {
            &self.review_queue
        } else {
            &self.queue
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    /// Unique cards in the run (the first-pass queue length).
    pub fn total_questions(&self) -> usize {
        self.queue.len()
    }

    /// Zero-based index within the current pass.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of cards in the current pass.
    pub fn pass_size(&self) -> usize {
        self.active_queue().len()
    }

    pub fn is_review_pass(&self) -> bool {
        self.review_pass
    }

    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }

    /// The card awaiting an answer, if the run is still going.
    pub fn current_card(&self) -> Option<&Card> {
        if self.completed.is_some() {
            return None;
        }
        self.active_queue().get(self.position)
    }

    /// The summary of a completed run.
    pub fn summary(&self) -> Option<&StudySession> {
        self.completed.as_ref()
    }
}
