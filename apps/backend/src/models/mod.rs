//! Store row models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use recall_core::mastery::MasteryTier;
use recall_core::scheduler;
use recall_core::session::SessionStep;

// Re-export shared types from recall-core
pub use recall_core::types::{
    Card, CardContent, CardId, CardProgress, DeckId, QuestionStats, Rating, RatingBreakdown,
    RatingEntry, RatingTally, SessionId, SessionResults, StudyMode, StudySession, UserId,
};

// === Store Row Types ===

/// Progress row in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCardProgress {
    pub user_id: UserId,
    pub card_id: CardId,
    pub deck_id: DeckId,
    pub study_mode: String,
    pub total_attempts: i32,
    pub total_errors: i32,
    pub consecutive_successes: i32,
    pub interval_hours: f64,
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub last_rating: Option<String>,
    pub easy_count: i32,
    pub normal_count: i32,
    pub hard_count: i32,
}

impl DbCardProgress {
    /// Create from a recall-core progress record
    pub fn from_progress(progress: &CardProgress) -> Self {
        Self {
            user_id: progress.user_id,
            card_id: progress.card_id,
            deck_id: progress.deck_id,
            study_mode: progress.study_mode.as_str().to_string(),
            total_attempts: progress.total_attempts as i32,
            total_errors: progress.total_errors as i32,
            consecutive_successes: progress.consecutive_successes as i32,
            interval_hours: progress.interval_hours,
            last_reviewed: progress.last_reviewed,
            next_review: progress.next_review,
            last_rating: progress.last_rating.map(|r| r.as_str().to_string()),
            easy_count: progress.rating_counts.easy as i32,
            normal_count: progress.rating_counts.normal as i32,
            hard_count: progress.rating_counts.hard as i32,
        }
    }

    /// Convert to a recall-core progress record
    pub fn to_progress(&self) -> CardProgress {
        CardProgress {
            card_id: self.card_id,
            deck_id: self.deck_id,
            user_id: self.user_id,
            study_mode: StudyMode::from_str(&self.study_mode)
                .unwrap_or(StudyMode::MultipleChoice),
            total_attempts: self.total_attempts as u32,
            total_errors: self.total_errors as u32,
            consecutive_successes: self.consecutive_successes as u32,
            interval_hours: self.interval_hours,
            last_reviewed: self.last_reviewed,
            next_review: self.next_review,
            last_rating: self.last_rating.as_deref().and_then(Rating::from_str),
            rating_counts: RatingTally {
                easy: self.easy_count as u32,
                normal: self.normal_count as u32,
                hard: self.hard_count as u32,
            },
        }
    }
}

/// Completed study run row in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStudySession {
    pub id: SessionId,
    pub user_id: UserId,
    pub deck_id: DeckId,
    pub study_mode: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_questions: i32,
    pub results: serde_json::Value,
}

impl DbStudySession {
    /// Create from a recall-core session summary
    pub fn from_session(session: &StudySession) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: session.id,
            user_id: session.user_id,
            deck_id: session.deck_id,
            study_mode: session.study_mode().as_str().to_string(),
            started_at: session.started_at,
            ended_at: session.ended_at,
            total_questions: session.total_questions as i32,
            results: serde_json::to_value(&session.results)?,
        })
    }
}

// === API Request/Response Types ===

/// A card as supplied by the presentation layer; the deck id comes from
/// the enclosing request.
#[derive(Debug, Serialize, Deserialize)]
pub struct CardPayload {
    pub id: CardId,
    pub prompt: String,
    pub content: CardContent,
}

impl CardPayload {
    pub fn into_card(self, deck_id: DeckId) -> Card {
        Card {
            id: self.id,
            deck_id,
            prompt: self.prompt,
            content: self.content,
        }
    }
}

/// A card shown to the learner: never carries the answer key.
#[derive(Debug, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl CardView {
    pub fn from_card(card: &Card) -> Self {
        let options = match &card.content {
            CardContent::MultipleChoice { options, .. } => Some(options.clone()),
            CardContent::Flashcard { .. } => None,
        };
        Self {
            id: card.id,
            prompt: card.prompt.clone(),
            options,
        }
    }
}

// Queue types
#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueRequest {
    pub deck_id: DeckId,
    pub cards: Vec<CardPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueResponse {
    pub deck_id: DeckId,
    pub due_count: usize,
    pub queue: Vec<QueueEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueEntry {
    pub card_id: CardId,
    pub prompt: String,
    pub due: bool,
    pub never_studied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

// Session types
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub deck_id: DeckId,
    pub study_mode: StudyMode,
    pub cards: Vec<CardPayload>,
}

/// Snapshot of a hosted run as the presentation layer sees it.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub deck_id: DeckId,
    pub study_mode: StudyMode,
    pub total_questions: usize,
    /// Zero-based index within the current pass.
    pub position: usize,
    pub pass_size: usize,
    pub review_pass: bool,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_card: Option<CardView>,
    /// Persistence warnings accumulated so far; purely informational.
    pub warnings: u32,
}

/// Where the run goes after a scored transition.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StepView {
    Next { card: CardView, review_pass: bool },
    Completed { summary: StudySession },
}

impl StepView {
    pub fn from_step(step: SessionStep) -> Self {
        match step {
            SessionStep::Next { card, review_pass } => Self::Next {
                card: CardView::from_card(&card),
                review_pass,
            },
            SessionStep::Completed(summary) => Self::Completed { summary: *summary },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub selected: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub correct_index: usize,
    pub streak: u32,
    pub mastery: MasteryTier,
    pub next_review: DateTime<Utc>,
    pub warnings: u32,
    pub next: StepView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevealResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateRequest {
    pub rating: Rating,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateResponse {
    pub interval_hours: f64,
    pub next_review: DateTime<Utc>,
    pub warnings: u32,
    pub next: StepView,
}

// Progress types
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressListResponse {
    pub deck_id: DeckId,
    pub cards: Vec<CardProgressView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardProgressView {
    pub card_id: CardId,
    pub study_mode: StudyMode,
    pub mastery: MasteryTier,
    pub due: bool,
    pub consecutive_successes: u32,
    pub total_attempts: u32,
    pub total_errors: u32,
    pub interval_hours: f64,
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rating: Option<Rating>,
    pub rating_counts: RatingTally,
}

impl CardProgressView {
    pub fn from_progress(progress: &CardProgress, now: DateTime<Utc>) -> Self {
        Self {
            card_id: progress.card_id,
            study_mode: progress.study_mode,
            mastery: MasteryTier::classify(progress.consecutive_successes),
            due: scheduler::is_due(progress, now),
            consecutive_successes: progress.consecutive_successes,
            total_attempts: progress.total_attempts,
            total_errors: progress.total_errors,
            interval_hours: progress.interval_hours,
            last_reviewed: progress.last_reviewed,
            next_review: progress.next_review,
            last_rating: progress.last_rating,
            rating_counts: progress.rating_counts,
        }
    }
}
