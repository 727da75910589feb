//! Flashcard session controller.
//!
//! One pass over the queue. Each card must be revealed before it can be
//! rated; there is no review pass, the rating already encodes how the
//! learner did.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Effect, SessionStep};
use crate::error::{SessionError, TransitionError};
use crate::policy::FlashcardPolicy;
use crate::scheduler;
use crate::types::{
    Card, CardContent, CardId, CardProgress, DeckId, Rating, RatingBreakdown, RatingEntry,
    SessionId, SessionResults, StudyMode, StudySession, UserId,
};

/// Feedback for one rated card.
#[derive(Debug, Clone, PartialEq)]
pub struct RateOutcome {
    pub interval_hours: f64,
    pub next_review: DateTime<Utc>,
    pub step: SessionStep,
    pub effects: Vec<Effect>,
}

/// State machine for one learner's flashcard run over a deck.
#[derive(Debug, Clone)]
pub struct FlashcardSession {
    id: SessionId,
    user_id: UserId,
    deck_id: DeckId,
    policy: FlashcardPolicy,
    started_at: DateTime<Utc>,
    queue: Vec<Card>,
    position: usize,
    revealed: bool,
    progress: HashMap<CardId, CardProgress>,
    ratings: Vec<RatingEntry>,
    completed: Option<StudySession>,
}

impl FlashcardSession {
    /// Start a run over an ordered queue of flashcard-content cards.
    pub fn start(
        policy: FlashcardPolicy,
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
                CardContent::Flashcard { answer } => {
                    if answer.trim().is_empty() {
                        return Err(TransitionError::InvalidCard {
                            card_id: card.id,
                            reason: "empty answer text".to_string(),
                        }
                        .into());
                    }
                }
                CardContent::MultipleChoice { .. } => {
                    return Err(TransitionError::ModeMismatch {
                        card_id: card.id,
                        expected: StudyMode::Flashcard,
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
            position: 0,
            revealed: false,
            progress,
            ratings: Vec::new(),
            completed: None,
        })
    }

    /// Turn the current card over and return its answer text. A card can
    /// only be revealed once per presentation.
    pub fn reveal(&mut self) -> Result<&str, SessionError> {
        if self.completed.is_some() {
            return Err(TransitionError::SessionCompleted.into());
        }
        if self.revealed {
            return Err(TransitionError::AlreadyRevealed.into());
        }

        let card = &self.queue[self.position];
        match &card.content {
            CardContent::Flashcard { answer } => {
                self.revealed = true;
                Ok(answer)
            }
            CardContent::MultipleChoice { .. } => Err(TransitionError::ModeMismatch {
                card_id: card.id,
                expected: StudyMode::Flashcard,
            }
            .into()),
        }
    }

    /// Record the learner's self-assessment for the revealed card and
    /// advance. Rating an unrevealed card is rejected with the session
    /// untouched.
    pub fn rate(&mut self, rating: Rating, now: DateTime<Utc>) -> Result<RateOutcome, SessionError> {
        if self.completed.is_some() {
            return Err(TransitionError::SessionCompleted.into());
        }
        if !self.revealed {
            return Err(TransitionError::NotRevealed.into());
        }

        let card = self.queue[self.position].clone();
        let mut record = self.progress.remove(&card.id).unwrap_or_else(|| {
            CardProgress::new(card.id, self.deck_id, self.user_id, StudyMode::Flashcard, now)
        });

        let interval_hours = self.policy.apply(record.interval_hours, rating)?;
        record.study_mode = StudyMode::Flashcard;
        record.last_rating = Some(rating);
        record.rating_counts.record(rating);
        scheduler::stamp(&mut record, interval_hours, now);

        self.ratings.push(RatingEntry {
            card_id: card.id,
            rating,
        });

        let next_review = record.next_review;
        let mut effects = vec![Effect::SaveProgress(record.clone())];
        self.progress.insert(card.id, record);

        self.revealed = false;
        self.position += 1;
        let step = if self.position < self.queue.len() {
            SessionStep::Next {
                card: self.queue[self.position].clone(),
                review_pass: false,
            }
        } else {
            let session = self.build_summary(now);
            self.completed = Some(session.clone());
            effects.push(Effect::SaveSession(session.clone()));
            SessionStep::Completed(Box::new(session))
        };

        Ok(RateOutcome {
            interval_hours,
            next_review,
            step,
            effects,
        })
    }

    fn build_summary(&self, now: DateTime<Utc>) -> StudySession {
        StudySession {
            id: self.id,
            user_id: self.user_id,
            deck_id: self.deck_id,
            started_at: self.started_at,
            ended_at: now,
            total_questions: self.queue.len() as u32,
            results: SessionResults::Flashcard {
                ratings: self.ratings.clone(),
                breakdown: RatingBreakdown::from_entries(&self.ratings),
            },
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

    pub fn total_questions(&self) -> usize {
        self.queue.len()
    }

    /// Zero-based index of the card being presented.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }

    /// The card being presented, if the run is still going.
    pub fn current_card(&self) -> Option<&Card> {
        if self.completed.is_some() {
            return None;
        }
        self.queue.get(self.position)
    }

    /// The summary of a completed run.
    pub fn summary(&self) -> Option<&StudySession> {
        self.completed.as_ref()
    }
}
