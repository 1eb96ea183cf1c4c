use std::path::PathBuf;

use thiserror::Error;

/// Errors from the persisted key-value store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KvError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors surfaced to the quiz client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Storage(#[from] KvError),
    #[error("failed to encode or decode stored state: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no user is logged in")]
    NotLoggedIn,
}
