use std::error::Error as _;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quiz_core::api::ErrorResponse;
use quiz_core::model::UserError;
use services::{AccountError, ScoreServiceError};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, warn};

/// Every way a request can fail, rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed payload")]
    MalformedPayload(#[from] JsonRejection),

    #[error("User already exists")]
    UserExists,

    #[error("{0}")]
    InvalidUser(#[source] UserError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Failed to register user")]
    Register(#[source] AccountError),

    #[error("Failed to login")]
    Login(#[source] AccountError),

    #[error("Failed to save score")]
    SaveScore(#[source] ScoreServiceError),

    #[error("Failed to retrieve scores")]
    ListScores(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to generate quiz questions")]
    Quiz(#[source] JoinError),
}

impl ApiError {
    #[must_use]
    pub fn from_register(err: AccountError) -> Self {
        match err {
            AccountError::AlreadyExists => ApiError::UserExists,
            AccountError::Invalid(user) => ApiError::InvalidUser(user),
            other => ApiError::Register(other),
        }
    }

    #[must_use]
    pub fn from_login(err: AccountError) -> Self {
        match err {
            AccountError::InvalidCredentials => ApiError::InvalidCredentials,
            other => ApiError::Login(other),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) | ApiError::UserExists | ApiError::InvalidUser(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Register(_)
            | ApiError::Login(_)
            | ApiError::SaveScore(_)
            | ApiError::ListScores(_)
            | ApiError::Quiz(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let cause = self.source().map(ToString::to_string);

        if status.is_server_error() {
            error!(cause = cause.as_deref().unwrap_or(""), "{self}");
        } else {
            warn!(cause = cause.as_deref().unwrap_or(""), "{self}");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
