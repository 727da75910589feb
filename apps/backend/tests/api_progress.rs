//! Progress API tests.
//!
//! These run the full router against the in-memory stores; no external
//! services are required.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use uuid::Uuid;

use recall_backend::models::{CardProgress, StudyMode};

use common::fixtures;
use common::TestContext;

/// Test the listing is empty for a deck the learner never studied.
#[tokio::test]
async fn test_progress_listing_empty_for_new_deck() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = TestContext::user();
    let deck_id = Uuid::new_v4();

    let response = server
        .get(&format!("/api/progress/{}", deck_id))
        .add_header("x-user-id", user.to_string())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deck_id"].as_str().unwrap(), deck_id.to_string());
    assert_eq!(body["cards"].as_array().unwrap().len(), 0);
}

/// Test the listing reports mastery tiers and due flags, most due first.
#[tokio::test]
async fn test_progress_listing_reports_mastery_and_due() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = TestContext::user();
    let deck_id = Uuid::new_v4();
    let now = Utc::now();

    let overdue = Uuid::new_v4();
    let mut progress = CardProgress::new(overdue, deck_id, user, StudyMode::MultipleChoice, now);
    progress.consecutive_successes = 8;
    progress.total_attempts = 12;
    progress.total_errors = 2;
    progress.next_review = now - ChronoDuration::hours(3);
    ctx.seed_progress(&progress).await;

    let scheduled = Uuid::new_v4();
    let mut progress = CardProgress::new(scheduled, deck_id, user, StudyMode::MultipleChoice, now);
    progress.consecutive_successes = 2;
    progress.total_attempts = 5;
    progress.total_errors = 3;
    progress.next_review = now + ChronoDuration::hours(6);
    ctx.seed_progress(&progress).await;

    // A record in another deck stays out of the listing.
    let elsewhere = CardProgress::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        user,
        StudyMode::Flashcard,
        now,
    );
    ctx.seed_progress(&elsewhere).await;

    let response = server
        .get(&format!("/api/progress/{}", deck_id))
        .add_header("x-user-id", user.to_string())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);

    assert_eq!(cards[0]["card_id"].as_str().unwrap(), overdue.to_string());
    assert_eq!(cards[0]["mastery"].as_str().unwrap(), "advanced");
    assert!(cards[0]["due"].as_bool().unwrap());
    assert_eq!(cards[0]["total_attempts"].as_u64().unwrap(), 12);

    assert_eq!(cards[1]["card_id"].as_str().unwrap(), scheduled.to_string());
    assert_eq!(cards[1]["mastery"].as_str().unwrap(), "beginner");
    assert!(!cards[1]["due"].as_bool().unwrap());
}

/// Test a completed run shows up in the listing.
#[tokio::test]
async fn test_completed_run_shows_in_listing() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = TestContext::user();
    let deck_id = Uuid::new_v4();

    let card = Uuid::new_v4();
    let cards = vec![fixtures::choice_card_with_id(
        card,
        "What is 2 + 2?",
        &["3", "4"],
        1,
    )];

    let response = server
        .post("/api/study/sessions")
        .add_header("x-user-id", user.to_string())
        .json(&fixtures::start_session_request(
            deck_id,
            "multiple_choice",
            &cards,
        ))
        .await;
    let body: serde_json::Value = response.json();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/study/sessions/{}/answer", session_id))
        .add_header("x-user-id", user.to_string())
        .json(&fixtures::answer_request(1))
        .await;
    response.assert_status_ok();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let response = server
        .get(&format!("/api/progress/{}", deck_id))
        .add_header("x-user-id", user.to_string())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let listed = body["cards"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["card_id"].as_str().unwrap(), card.to_string());
    assert_eq!(listed[0]["consecutive_successes"].as_u64().unwrap(), 1);
    assert_eq!(listed[0]["study_mode"].as_str().unwrap(), "multiple_choice");
    // One correct answer schedules the card hours out, so nothing is due.
    assert!(!listed[0]["due"].as_bool().unwrap());
}

/// Test the progress endpoint requires authentication.
#[tokio::test]
async fn test_progress_requires_auth() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .get(&format!("/api/progress/{}", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
