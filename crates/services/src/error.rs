//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::UserError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a `CompletionClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("generator returned an empty response")]
    EmptyResponse,
    #[error("generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("User already exists")]
    AlreadyExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Invalid(#[from] UserError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ScoreService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoreServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
