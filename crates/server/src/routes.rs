use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State as AxumState, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use quiz_core::api::{
    LoginRequest, QuizRequest, QuizResponse, RegisterRequest, SaveScoreRequest, ScoreResponse,
    UserResponse,
};
use quiz_core::model::UserId;
use tracing::info;

use crate::{error::ApiError, state::State};

type AppState = AxumState<Arc<State>>;

pub async fn register_handler(
    AxumState(state): AppState,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let user = state
        .accounts
        .register(payload.into())
        .await
        .map_err(ApiError::from_register)?;

    let body = UserResponse {
        message: "User registered successfully".into(),
        user,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn login_handler(
    AxumState(state): AppState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let user = state
        .accounts
        .login(&payload.email, &payload.password)
        .await
        .map_err(ApiError::from_login)?;

    Ok(Json(UserResponse {
        message: "Login successful".into(),
        user,
    }))
}

pub async fn save_score_handler(
    AxumState(state): AppState,
    payload: Result<Json<SaveScoreRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let score = state
        .scores
        .save_score(payload.into())
        .await
        .map_err(ApiError::SaveScore)?;

    let body = ScoreResponse {
        message: "Score saved successfully".into(),
        score,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn list_scores_handler(
    AxumState(state): AppState,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|e| ApiError::ListScores(Box::new(e)))?;
    let scores = state
        .scores
        .list_scores(user_id)
        .await
        .map_err(|e| ApiError::ListScores(Box::new(e)))?;

    Ok(Json(scores))
}

pub async fn static_quiz_handler() -> impl IntoResponse {
    Json(QuizResponse::static_sample())
}

pub async fn ai_quiz_handler(
    AxumState(state): AppState,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let request = payload.to_generation_request();

    if let Some(refresh) = payload.refresh_count() {
        info!(
            "Refresh request #{refresh} for topic {} with temperature {:.1}",
            request.topic, request.temperature
        );
    }

    // A panic during generation surfaces as `ApiError::Quiz`.
    let quiz = Arc::clone(&state.quiz);
    let questions = tokio::spawn(async move { quiz.generate_quiz(&request).await })
        .await
        .map_err(ApiError::Quiz)?;

    Ok(Json(QuizResponse { questions }))
}
