//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// Create a multiple-choice card payload with a fixed id.
pub fn choice_card_with_id(
    id: Uuid,
    prompt: &str,
    options: &[&str],
    correct_index: usize,
) -> serde_json::Value {
    json!({
        "id": id,
        "prompt": prompt,
        "content": {
            "kind": "multiple_choice",
            "options": options,
            "correct_index": correct_index,
        }
    })
}

/// Create a multiple-choice card payload.
pub fn choice_card(prompt: &str, options: &[&str], correct_index: usize) -> serde_json::Value {
    choice_card_with_id(Uuid::new_v4(), prompt, options, correct_index)
}

/// Create a flashcard payload with a fixed id.
pub fn flash_card_with_id(id: Uuid, prompt: &str, answer: &str) -> serde_json::Value {
    json!({
        "id": id,
        "prompt": prompt,
        "content": {
            "kind": "flashcard",
            "answer": answer,
        }
    })
}

/// Create a flashcard payload.
pub fn flash_card(prompt: &str, answer: &str) -> serde_json::Value {
    flash_card_with_id(Uuid::new_v4(), prompt, answer)
}

/// Create a start session request body.
pub fn start_session_request(
    deck_id: Uuid,
    study_mode: &str,
    cards: &[serde_json::Value],
) -> serde_json::Value {
    json!({
        "deck_id": deck_id,
        "study_mode": study_mode,
        "cards": cards,
    })
}

/// Create a study queue request body.
pub fn queue_request(deck_id: Uuid, cards: &[serde_json::Value]) -> serde_json::Value {
    json!({
        "deck_id": deck_id,
        "cards": cards,
    })
}

/// Create an answer request body.
pub fn answer_request(selected: usize) -> serde_json::Value {
    json!({ "selected": selected })
}

/// Create a rate request body.
pub fn rate_request(rating: &str) -> serde_json::Value {
    json!({ "rating": rating })
}
