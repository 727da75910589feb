//! Core types for the scheduling engine and study sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card identifier.
pub type CardId = Uuid;
/// Deck identifier.
pub type DeckId = Uuid;
/// Learner identifier, issued by the platform's identity provider.
pub type UserId = Uuid;
/// Study run identifier.
pub type SessionId = Uuid;

/// The two study modes, each with its own interval policy and session
/// state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    MultipleChoice,
    Flashcard,
}

impl StudyMode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::Flashcard => "flashcard",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(Self::MultipleChoice),
            "flashcard" => Some(Self::Flashcard),
            _ => None,
        }
    }
}

impl std::fmt::Display for StudyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learner's self-assessment of recall difficulty in flashcard mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Normal,
    Easy,
}

impl Rating {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Normal => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Normal),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Get the rating name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Normal => "normal",
            Self::Easy => "easy",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "again" => Some(Self::Again),
            "hard" => Some(Self::Hard),
            "normal" => Some(Self::Normal),
            "easy" => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Mode-specific card payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CardContent {
    /// Ordered answer options with the index of the correct one.
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    /// Prompt/answer pair revealed on request.
    Flashcard { answer: String },
}

impl CardContent {
    /// The study mode this content belongs to.
    pub fn study_mode(&self) -> StudyMode {
        match self {
            Self::MultipleChoice { .. } => StudyMode::MultipleChoice,
            Self::Flashcard { .. } => StudyMode::Flashcard,
        }
    }
}

/// A card as supplied by the presentation layer. Immutable once created;
/// the order of a card slice is the deck's creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub deck_id: DeckId,
    pub prompt: String,
    pub content: CardContent,
}

impl Card {
    pub fn study_mode(&self) -> StudyMode {
        self.content.study_mode()
    }
}

/// Per-card rating counters carried on progress records.
///
/// `again` is intentionally absent: a reset is not a graded recall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTally {
    pub easy: u32,
    pub normal: u32,
    pub hard: u32,
}

impl RatingTally {
    /// Count a rating. `Again` is not tallied.
    pub fn record(&mut self, rating: Rating) {
        match rating {
            Rating::Easy => self.easy += 1,
            Rating::Normal => self.normal += 1,
            Rating::Hard => self.hard += 1,
            Rating::Again => {}
        }
    }
}

/// Per-bucket rating counts for a flashcard session summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    pub again: u32,
    pub hard: u32,
    pub normal: u32,
    pub easy: u32,
}

impl RatingBreakdown {
    pub fn record(&mut self, rating: Rating) {
        match rating {
            Rating::Again => self.again += 1,
            Rating::Hard => self.hard += 1,
            Rating::Normal => self.normal += 1,
            Rating::Easy => self.easy += 1,
        }
    }

    pub fn from_entries(entries: &[RatingEntry]) -> Self {
        let mut breakdown = Self::default();
        for entry in entries {
            breakdown.record(entry.rating);
        }
        breakdown
    }
}

/// Per-user, per-card scheduling state.
///
/// Created on the first answer to a card and mutated only by interval
/// policy output; records accumulate, they are never deleted. Invariants:
/// `next_review == last_reviewed + interval_hours` and
/// `total_errors <= total_attempts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProgress {
    pub card_id: CardId,
    pub deck_id: DeckId,
    pub user_id: UserId,
    /// Mode of the most recent review; both modes upsert the same record.
    pub study_mode: StudyMode,
    pub total_attempts: u32,
    pub total_errors: u32,
    pub consecutive_successes: u32,
    pub interval_hours: f64,
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rating: Option<Rating>,
    pub rating_counts: RatingTally,
}

impl CardProgress {
    /// Fresh record for a card answered for the first time: zero interval,
    /// due immediately.
    pub fn new(
        card_id: CardId,
        deck_id: DeckId,
        user_id: UserId,
        study_mode: StudyMode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            card_id,
            deck_id,
            user_id,
            study_mode,
            total_attempts: 0,
            total_errors: 0,
            consecutive_successes: 0,
            interval_hours: 0.0,
            last_reviewed: now,
            next_review: now,
            last_rating: None,
            rating_counts: RatingTally::default(),
        }
    }
}

/// Per-question metadata accumulated during a multiple-choice run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub card_id: CardId,
    pub prompt: String,
    pub attempts: u32,
    pub errors: u32,
}

/// One rating given during a flashcard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub card_id: CardId,
    pub rating: Rating,
}

/// Mode-specific results of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SessionResults {
    MultipleChoice {
        hits: u32,
        misses: u32,
        /// `hits / total_questions`: the share of cards eventually
        /// answered correctly.
        accuracy: f64,
        /// Sorted descending by error count for learner feedback.
        questions: Vec<QuestionStats>,
    },
    Flashcard {
        ratings: Vec<RatingEntry>,
        breakdown: RatingBreakdown,
    },
}

/// Summary of one completed study run, persisted exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: SessionId,
    pub user_id: UserId,
    pub deck_id: DeckId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_questions: u32,
    pub results: SessionResults,
}

impl StudySession {
    pub fn study_mode(&self) -> StudyMode {
        match self.results {
            SessionResults::MultipleChoice { .. } => StudyMode::MultipleChoice,
            SessionResults::Flashcard { .. } => StudyMode::Flashcard,
        }
    }
}
