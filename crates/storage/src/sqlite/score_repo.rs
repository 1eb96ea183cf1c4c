use chrono::{DateTime, Utc};
use quiz_core::model::{NewScore, ScoreRecord, UserId};

use super::SqliteRepository;
use super::mapping::{score_from_row, user_id_to_i64, write_error};
use crate::repository::{ScoreRepository, StorageError};

#[async_trait::async_trait]
impl ScoreRepository for SqliteRepository {
    async fn insert_score(
        &self,
        score: NewScore,
        created_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO quiz_scores (user_id, topic, score, total_questions, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, user_id, topic, score, total_questions, created_at
            ",
        )
        .bind(user_id_to_i64(score.user_id)?)
        .bind(score.topic)
        .bind(i64::from(score.score))
        .bind(i64::from(score.total_questions))
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        score_from_row(&row)
    }

    async fn list_scores_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, topic, score, total_questions, created_at
            FROM quiz_scores
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(score_from_row(&row)?);
        }
        Ok(out)
    }
}
