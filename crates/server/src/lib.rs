//! HTTP surface of the quiz backend.
//!
//! # Endpoints
//! - `POST /api/register` creates an account, `201` with the public profile
//! - `POST /api/login` checks credentials, `401` on mismatch
//! - `POST /api/scores` stores a finished quiz, `201` with the stored row
//! - `GET /api/scores/{user_id}` lists a user's scores, newest first
//! - `GET /api/quiz` serves a fixed one-question quiz
//! - `POST /api/ai-quiz` generates questions, filtered against the topic's recent history
//!
//! Errors are JSON bodies of the form `{"error": "..."}`.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use services::{AppServices, AppServicesError, Clock};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::ServerConfig;
use routes::{
    ai_quiz_handler, list_scores_handler, login_handler, register_handler, save_score_handler,
    static_quiz_handler,
};
use state::State;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    #[error(transparent)]
    Services(#[from] AppServicesError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the router over already-wired services.
pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route("/api/scores", post(save_score_handler))
        .route("/api/scores/{user_id}", get(list_scores_handler))
        .route("/api/quiz", get(static_quiz_handler))
        .route("/api/ai-quiz", post(ai_quiz_handler))
        .layer(cors)
        .with_state(state)
}

/// Open storage, bind the configured port and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns `ServerError` if storage setup, binding or serving fails.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing state...");
    let services =
        AppServices::new_sqlite(&config.db_url, Clock::default(), config.completion.clone())
            .await?;
    let app = router(State::new(&services));

    let address = config.address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
