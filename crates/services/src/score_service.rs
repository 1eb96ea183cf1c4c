use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{NewScore, ScoreRecord, UserId};
use storage::repository::ScoreRepository;

use crate::error::ScoreServiceError;

#[derive(Clone)]
pub struct ScoreService {
    clock: Clock,
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreService {
    #[must_use]
    pub fn new(clock: Clock, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { clock, scores }
    }

    /// Store a finished quiz, stamped with the service clock.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError` on persistence failures.
    pub async fn save_score(&self, score: NewScore) -> Result<ScoreRecord, ScoreServiceError> {
        Ok(self.scores.insert_score(score, self.clock.now()).await?)
    }

    /// A user's quiz history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError` on persistence failures.
    pub async fn list_scores(&self, user_id: UserId) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.list_scores_for_user(user_id).await?)
    }
}
