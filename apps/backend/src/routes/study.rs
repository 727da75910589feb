//! Study endpoints: queue preview and hosted session runs.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use recall_core::policy::{FlashcardPolicy, MultipleChoicePolicy};
use recall_core::scheduler;
use recall_core::session::{FlashcardSession, MultipleChoiceSession, SessionStep};

use crate::error::{ApiError, Result};
use crate::models::{
    AnswerRequest, AnswerResponse, Card, CardId, CardProgress, CardView, QueueEntry, RateRequest,
    RateResponse, RevealResponse, SessionId, SessionView, StartSessionRequest, StepView,
    StudyMode, StudyQueueRequest, StudyQueueResponse,
};
use crate::routes::auth::AuthenticatedUser;
use crate::services::sessions::StudyRun;
use crate::AppState;

fn session_view(run: &StudyRun, warnings: u32) -> SessionView {
    SessionView {
        session_id: run.id(),
        deck_id: run.deck_id(),
        study_mode: run.study_mode(),
        total_questions: run.total_questions(),
        position: run.position(),
        pass_size: run.pass_size(),
        review_pass: run.is_review_pass(),
        revealed: run.is_revealed(),
        current_card: run.current_card().map(CardView::from_card),
        warnings,
    }
}

/// POST /api/study/queue - preview the review order for a deck
pub async fn queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<StudyQueueRequest>,
) -> Result<Json<StudyQueueResponse>> {
    let deck_id = payload.deck_id;
    let progress = state.progress_store.get(auth.user_id, deck_id).await?;

    let cards: Vec<Card> = payload
        .cards
        .into_iter()
        .map(|card| card.into_card(deck_id))
        .collect();
    let ordered = scheduler::session_queue(&cards, &progress);

    let now = Utc::now();
    let by_card: HashMap<CardId, &CardProgress> =
        progress.iter().map(|p| (p.card_id, p)).collect();

    let queue: Vec<QueueEntry> = ordered
        .iter()
        .map(|card| match by_card.get(&card.id) {
            Some(progress) => QueueEntry {
                card_id: card.id,
                prompt: card.prompt.clone(),
                due: scheduler::is_due(progress, now),
                never_studied: false,
                next_review: Some(progress.next_review),
            },
            None => QueueEntry {
                card_id: card.id,
                prompt: card.prompt.clone(),
                due: true,
                never_studied: true,
                next_review: None,
            },
        })
        .collect();
    let due_count = queue.iter().filter(|entry| entry.due).count();

    Ok(Json(StudyQueueResponse {
        deck_id,
        due_count,
        queue,
    }))
}

/// POST /api/study/sessions - start a hosted run over a deck
pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let deck_id = payload.deck_id;

    // A failed read aborts the start: treating every card as never-studied
    // would clobber real scheduling state on the first write.
    let progress = state.progress_store.get(auth.user_id, deck_id).await?;

    let cards: Vec<Card> = payload
        .cards
        .into_iter()
        .map(|card| card.into_card(deck_id))
        .collect();
    let queue = scheduler::session_queue(&cards, &progress);

    let now = Utc::now();
    let run = match payload.study_mode {
        StudyMode::MultipleChoice => StudyRun::MultipleChoice(MultipleChoiceSession::start(
            MultipleChoicePolicy::default(),
            auth.user_id,
            deck_id,
            queue,
            progress,
            now,
        )?),
        StudyMode::Flashcard => StudyRun::Flashcard(FlashcardSession::start(
            FlashcardPolicy::default(),
            auth.user_id,
            deck_id,
            queue,
            progress,
            now,
        )?),
    };

    let view = session_view(&run, 0);
    state.registry.insert(run);

    tracing::info!(
        "Started {} session {} with {} cards",
        view.study_mode,
        view.session_id,
        view.total_questions
    );

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/study/sessions/:id - current position of a live run
pub async fn view(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionView>> {
    let view = state
        .registry
        .with_entry(session_id, auth.user_id, |run, warnings, _| {
            session_view(run, warnings.load(Ordering::Relaxed))
        })
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))?;

    Ok(Json(view))
}

/// POST /api/study/sessions/:id/answer - score one multiple-choice answer
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<SessionId>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let now = Utc::now();
    let (outcome, warnings) = state
        .registry
        .with_entry(session_id, auth.user_id, |run, warnings, effects| {
            let StudyRun::MultipleChoice(session) = run else {
                return Err(ApiError::BadRequest(
                    "Session is not a multiple-choice run".to_string(),
                ));
            };
            let mut outcome = session.submit_answer(payload.selected, now)?;
            for effect in outcome.effects.drain(..) {
                // The worker outlives the entry; send fails only at shutdown.
                let _ = effects.send(effect);
            }
            Ok((outcome, warnings.load(Ordering::Relaxed)))
        })
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))??;

    if matches!(outcome.step, SessionStep::Completed(_)) {
        state.registry.remove(session_id, auth.user_id);
    }

    Ok(Json(AnswerResponse {
        correct: outcome.correct,
        correct_index: outcome.correct_index,
        streak: outcome.streak,
        mastery: outcome.mastery,
        next_review: outcome.next_review,
        warnings,
        next: StepView::from_step(outcome.step),
    }))
}

/// POST /api/study/sessions/:id/reveal - show the back of the current card
pub async fn reveal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<RevealResponse>> {
    let answer = state
        .registry
        .with_entry(session_id, auth.user_id, |run, _, _| {
            let StudyRun::Flashcard(session) = run else {
                return Err(ApiError::BadRequest(
                    "Session is not a flashcard run".to_string(),
                ));
            };
            Ok(session.reveal()?.to_string())
        })
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))??;

    Ok(Json(RevealResponse { answer }))
}

/// POST /api/study/sessions/:id/rate - rate the revealed card
pub async fn rate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<SessionId>,
    Json(payload): Json<RateRequest>,
) -> Result<Json<RateResponse>> {
    let now = Utc::now();
    let (outcome, warnings) = state
        .registry
        .with_entry(session_id, auth.user_id, |run, warnings, effects| {
            let StudyRun::Flashcard(session) = run else {
                return Err(ApiError::BadRequest(
                    "Session is not a flashcard run".to_string(),
                ));
            };
            let mut outcome = session.rate(payload.rating, now)?;
            for effect in outcome.effects.drain(..) {
                let _ = effects.send(effect);
            }
            Ok((outcome, warnings.load(Ordering::Relaxed)))
        })
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))??;

    if matches!(outcome.step, SessionStep::Completed(_)) {
        state.registry.remove(session_id, auth.user_id);
    }

    Ok(Json(RateResponse {
        interval_hours: outcome.interval_hours,
        next_review: outcome.next_review,
        warnings,
        next: StepView::from_step(outcome.step),
    }))
}

/// DELETE /api/study/sessions/:id - abandon a run
///
/// Complete-or-nothing: the state machine is dropped and no session
/// summary is written. Progress already saved for answered cards stays.
pub async fn abandon(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode> {
    if state.registry.remove(session_id, auth.user_id) {
        tracing::info!("Study session {} abandoned", session_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "Session {} not found",
            session_id
        )))
    }
}
