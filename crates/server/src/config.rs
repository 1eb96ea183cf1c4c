use std::{env, fmt::Display, str::FromStr};

use services::CompletionConfig;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_PORT: &str = "5000";
pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_url: String,
    pub completion: Option<CompletionConfig>,
}

impl ServerConfig {
    /// Read `QUIZ_PORT`, `QUIZ_DB_URL` and the generator settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a set variable does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("QUIZ_PORT", DEFAULT_PORT)?,
            db_url: try_load("QUIZ_DB_URL", DEFAULT_DB_URL)?,
            completion: CompletionConfig::from_env(),
        })
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        })
}
