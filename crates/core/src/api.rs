//! JSON bodies exchanged between the quiz server and its clients.

use serde::{Deserialize, Serialize};

use crate::model::{GenerationRequest, NewScore, NewUser, Question, ScoreRecord, UserId, UserProfile};

/// Topic used when a quiz request names none.
pub const DEFAULT_TOPIC: &str = "general knowledge";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveScoreRequest {
    pub user_id: UserId,
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
}

impl From<SaveScoreRequest> for NewScore {
    fn from(req: SaveScoreRequest) -> Self {
        NewScore {
            user_id: req.user_id,
            topic: req.topic,
            score: req.score,
            total_questions: req.total_questions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub message: String,
    pub score: ScoreRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(
        rename = "refreshId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_id: Option<u64>,
    #[serde(
        rename = "refreshCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_count: Option<u32>,
}

impl QuizRequest {
    /// The refresh count, if this request is a refresh (non-zero id and count).
    #[must_use]
    pub fn refresh_count(&self) -> Option<u32> {
        match (self.refresh_id, self.refresh_count) {
            (Some(id), Some(count)) if id != 0 && count != 0 => Some(count),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_generation_request(&self) -> GenerationRequest {
        let topic = self
            .topic
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TOPIC);
        let count = self.count.unwrap_or(1);
        match self.refresh_count() {
            Some(refresh) => GenerationRequest::refresh(topic, count, refresh),
            None => GenerationRequest::new(topic, count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<Question>,
}

impl QuizResponse {
    /// Fixed payload served by the static quiz endpoint.
    #[must_use]
    pub fn static_sample() -> Self {
        Self {
            questions: vec![Question::new(
                "What is 2 + 2?",
                vec!["3".into(), "4".into(), "5".into()],
                "4",
            )],
        }
    }
}
