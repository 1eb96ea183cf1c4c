use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use crate::repository::{ScoreRepository, Storage, UserRepository};

mod mapping;
mod migrate;
mod score_repo;
mod user_repo;

/// Newest schema version this build knows how to use.
pub const SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("database schema v{found} is newer than supported v{supported}")]
    SchemaTooNew { found: i64, supported: i64 },
}

/// True for URLs that open a memory-only database.
#[must_use]
pub fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

impl SqliteRepository {
    /// Open a pool with foreign keys enforced. File databases also get WAL
    /// journaling and a busy timeout; memory databases keep their default
    /// journal.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the pool cannot connect or a pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let file_backed = !is_in_memory(database_url);
        let options = if file_backed {
            SqlitePoolOptions::new().max_connections(5)
        } else {
            // A memory database lives only as long as its connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        };
        let pool = options
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON;")
                        .execute(&mut *conn)
                        .await?;
                    if file_backed {
                        sqlx::query("PRAGMA journal_mode = WAL;")
                            .execute(&mut *conn)
                            .await?;
                        sqlx::query("PRAGMA busy_timeout = 5000;")
                            .execute(&mut *conn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply pending migrations and return the resulting schema version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError::SchemaTooNew` for a database written by a
    /// newer build, or the failing query's error.
    pub async fn migrate(&self) -> Result<i64, SqliteInitError> {
        let version = migrate::run_migrations(&self.pool).await?;
        if version > SCHEMA_VERSION {
            return Err(SqliteInitError::SchemaTooNew {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(version)
    }
}

impl Storage {
    /// Users and scores in the `SQLite` database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connecting or migrating fails.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        let schema_version = repo.migrate().await?;
        info!(
            schema_version,
            in_memory = is_in_memory(database_url),
            "sqlite storage ready"
        );
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let scores: Arc<dyn ScoreRepository> = Arc::new(repo);
        Ok(Self { users, scores })
    }
}
