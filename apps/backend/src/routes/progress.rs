//! Per-card progress endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::{CardProgressView, DeckId, ProgressListResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/progress/:deck_id - the learner's scheduling state for a deck
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<DeckId>,
) -> Result<Json<ProgressListResponse>> {
    let mut records = state.progress_store.get(auth.user_id, deck_id).await?;
    records.sort_by_key(|progress| progress.next_review);

    let now = Utc::now();
    let cards = records
        .iter()
        .map(|progress| CardProgressView::from_progress(progress, now))
        .collect();

    Ok(Json(ProgressListResponse { deck_id, cards }))
}
