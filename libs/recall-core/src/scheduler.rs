//! Review scheduling over per-card progress.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::types::{Card, CardProgress};

/// Order a deck for a study run: never-studied cards first, then ascending
/// next-review time. Ties keep the deck's creation order (the sort is
/// stable). Cards that are not yet due still appear, at the tail; callers
/// that want a due-only subset filter with [`is_due`].
///
/// Progress entries for cards outside `cards` are ignored, so a caller may
/// pass a whole-deck progress listing unfiltered.
pub fn session_queue(cards: &[Card], progress: &[CardProgress]) -> Vec<Card> {
    let due_times: HashMap<_, _> = progress
        .iter()
        .map(|p| (p.card_id, p.next_review))
        .collect();

    let mut queue = cards.to_vec();
    queue.sort_by_key(|card| {
        due_times
            .get(&card.id)
            .copied()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    });
    queue
}

/// Whether a card is due for review. Cards without a progress record are
/// always due.
pub fn is_due(progress: &CardProgress, now: DateTime<Utc>) -> bool {
    progress.next_review <= now
}

/// Write a policy-produced interval onto a progress record, keeping
/// `next_review == last_reviewed + interval_hours` at seconds resolution.
pub fn stamp(progress: &mut CardProgress, interval_hours: f64, now: DateTime<Utc>) {
    progress.interval_hours = interval_hours;
    progress.last_reviewed = now;
    progress.next_review = now + Duration::seconds((interval_hours * 3600.0) as i64);
}
