use async_trait::async_trait;
use quiz_core::api::{
    ErrorResponse, LoginRequest, QuizRequest, QuizResponse, RegisterRequest, SaveScoreRequest,
    ScoreResponse, UserResponse,
};
use quiz_core::model::{Question, ScoreRecord, UserId, UserProfile};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// The quiz server as seen by a client.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the server's message on rejection.
    async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ClientError>;

    /// # Errors
    ///
    /// Returns `ClientError::Api` with the server's message on rejection.
    async fn login(&self, request: &LoginRequest) -> Result<UserProfile, ClientError>;

    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server rejects it.
    async fn save_score(&self, request: &SaveScoreRequest) -> Result<ScoreRecord, ClientError>;

    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server rejects it.
    async fn list_scores(&self, user_id: UserId) -> Result<Vec<ScoreRecord>, ClientError>;

    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the body has no question list.
    async fn generate_quiz(&self, request: &QuizRequest) -> Result<Vec<Question>, ClientError>;
}

/// `reqwest` client for the quiz server's JSON API.
#[derive(Clone)]
pub struct HttpQuizApi {
    http: Client,
    base_url: String,
}

impl HttpQuizApi {
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.url("/api/register"))
            .json(request)
            .send()
            .await?;
        Ok(read_json::<UserResponse>(response).await?.user)
    }

    async fn login(&self, request: &LoginRequest) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.url("/api/login"))
            .json(request)
            .send()
            .await?;
        Ok(read_json::<UserResponse>(response).await?.user)
    }

    async fn save_score(&self, request: &SaveScoreRequest) -> Result<ScoreRecord, ClientError> {
        let response = self
            .http
            .post(self.url("/api/scores"))
            .json(request)
            .send()
            .await?;
        Ok(read_json::<ScoreResponse>(response).await?.score)
    }

    async fn list_scores(&self, user_id: UserId) -> Result<Vec<ScoreRecord>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/scores/{user_id}")))
            .send()
            .await?;
        read_json(response).await
    }

    async fn generate_quiz(&self, request: &QuizRequest) -> Result<Vec<Question>, ClientError> {
        let response = self
            .http
            .post(self.url("/api/ai-quiz"))
            .json(request)
            .send()
            .await?;
        Ok(read_json::<QuizResponse>(response).await?.questions)
    }
}
