use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ScoreId, UserId};

/// A finished quiz result waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub user_id: UserId,
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
}

/// A stored quiz result, shaped like a `quiz_scores` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub user_id: UserId,
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
    pub created_at: DateTime<Utc>,
}

impl ScoreRecord {
    #[must_use]
    pub fn from_new(id: ScoreId, score: NewScore, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: score.user_id,
            topic: score.topic,
            score: score.score,
            total_questions: score.total_questions,
            created_at,
        }
    }
}
