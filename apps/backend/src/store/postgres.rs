//! PostgreSQL store adapters.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use recall_core::types::{CardProgress, DeckId, StudySession, UserId};

use super::{ProgressStore, SessionStore, StoreError};
use crate::models::{DbCardProgress, DbStudySession};

/// Store backed by PostgreSQL with an embedded migration set.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProgressStore for PostgresStore {
    async fn get(
        &self,
        user_id: UserId,
        deck_id: DeckId,
    ) -> Result<Vec<CardProgress>, StoreError> {
        let rows = sqlx::query_as::<_, DbCardProgress>(
            r#"
            SELECT user_id, card_id, deck_id, study_mode, total_attempts, total_errors,
                   consecutive_successes, interval_hours, last_reviewed, next_review,
                   last_rating, easy_count, normal_count, hard_count
            FROM card_progress
            WHERE user_id = $1 AND deck_id = $2
            "#,
        )
        .bind(user_id)
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.to_progress()).collect())
    }

    async fn put(&self, progress: &CardProgress) -> Result<(), StoreError> {
        let row = DbCardProgress::from_progress(progress);

        sqlx::query(
            r#"
            INSERT INTO card_progress (user_id, card_id, deck_id, study_mode, total_attempts,
                                       total_errors, consecutive_successes, interval_hours,
                                       last_reviewed, next_review, last_rating,
                                       easy_count, normal_count, hard_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (user_id, card_id) DO UPDATE SET
                deck_id = EXCLUDED.deck_id,
                study_mode = EXCLUDED.study_mode,
                total_attempts = EXCLUDED.total_attempts,
                total_errors = EXCLUDED.total_errors,
                consecutive_successes = EXCLUDED.consecutive_successes,
                interval_hours = EXCLUDED.interval_hours,
                last_reviewed = EXCLUDED.last_reviewed,
                next_review = EXCLUDED.next_review,
                last_rating = EXCLUDED.last_rating,
                easy_count = EXCLUDED.easy_count,
                normal_count = EXCLUDED.normal_count,
                hard_count = EXCLUDED.hard_count,
                updated_at = NOW()
            "#,
        )
        .bind(row.user_id)
        .bind(row.card_id)
        .bind(row.deck_id)
        .bind(row.study_mode)
        .bind(row.total_attempts)
        .bind(row.total_errors)
        .bind(row.consecutive_successes)
        .bind(row.interval_hours)
        .bind(row.last_reviewed)
        .bind(row.next_review)
        .bind(row.last_rating)
        .bind(row.easy_count)
        .bind(row.normal_count)
        .bind(row.hard_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn put(&self, session: &StudySession) -> Result<(), StoreError> {
        let row = DbStudySession::from_session(session)
            .map_err(|e| StoreError::Encoding(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO study_sessions (id, user_id, deck_id, study_mode, started_at,
                                        ended_at, total_questions, results)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.deck_id)
        .bind(row.study_mode)
        .bind(row.started_at)
        .bind(row.ended_at)
        .bind(row.total_questions)
        .bind(row.results)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
