use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{NewScore, ScoreId, ScoreRecord, User, UserId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert shape for a user whose password has already been hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Repository contract for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username or email is taken.
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, StorageError>;

    /// Fetch a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on persistence failures.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Fetch any user holding either `email` or `username`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on persistence failures.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, StorageError>;
}

/// Repository contract for quiz results.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Persist a score and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist, or other storage errors.
    async fn insert_score(
        &self,
        score: NewScore,
        created_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError>;

    /// List a user's scores, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on persistence failures.
    async fn list_scores_for_user(&self, user_id: UserId)
    -> Result<Vec<ScoreRecord>, StorageError>;
}

#[derive(Default)]
struct MemoryTables {
    users: BTreeMap<UserId, User>,
    scores: BTreeMap<ScoreId, ScoreRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<MemoryTables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryTables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, StorageError> {
        let mut guard = self.lock()?;
        let taken = guard
            .users
            .values()
            .any(|u| u.email() == user.email || u.username() == user.username);
        if taken {
            return Err(StorageError::Conflict);
        }
        let next = guard.users.keys().next_back().map_or(1, |id| id.value() + 1);
        let id = UserId::new(next);
        let stored = User::from_persisted(
            id,
            user.username,
            user.email,
            user.password_hash,
            user.created_at,
        );
        guard.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .users
            .values()
            .find(|u| u.email() == email || u.username() == username)
            .cloned())
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn insert_score(
        &self,
        score: NewScore,
        created_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&score.user_id) {
            return Err(StorageError::NotFound);
        }
        let next = guard.scores.keys().next_back().map_or(1, |id| id.value() + 1);
        let record = ScoreRecord::from_new(ScoreId::new(next), score, created_at);
        guard.scores.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_scores_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<ScoreRecord> = guard
            .scores
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

/// Aggregates user and score repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let scores: Arc<dyn ScoreRepository> = Arc::new(repo);
        Self { users, scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    fn new_user(username: &str, email: &str) -> NewUserRecord {
        NewUserRecord {
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            created_at: fixed_now(),
        }
    }

    fn score_for(user_id: UserId, topic: &str, score: u32) -> NewScore {
        NewScore {
            user_id,
            topic: topic.into(),
            score,
            total_questions: 5,
        }
    }

    #[tokio::test]
    async fn assigns_sequential_user_ids() {
        let repo = InMemoryRepository::new();
        let a = repo.insert_user(new_user("ada", "ada@x.io")).await.unwrap();
        let b = repo.insert_user(new_user("bob", "bob@x.io")).await.unwrap();
        assert_eq!(a.id(), UserId::new(1));
        assert_eq!(b.id(), UserId::new(2));
    }

    #[tokio::test]
    async fn duplicate_email_or_username_conflicts() {
        let repo = InMemoryRepository::new();
        repo.insert_user(new_user("ada", "ada@x.io")).await.unwrap();
        let by_email = repo.insert_user(new_user("other", "ada@x.io")).await;
        let by_name = repo.insert_user(new_user("ada", "other@x.io")).await;
        assert!(matches!(by_email, Err(StorageError::Conflict)));
        assert!(matches!(by_name, Err(StorageError::Conflict)));
        assert!(
            repo.find_by_email_or_username("nobody@x.io", "ada")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn scores_list_newest_first() {
        let repo = InMemoryRepository::new();
        let user = repo.insert_user(new_user("ada", "ada@x.io")).await.unwrap();
        let t0 = fixed_now();
        repo.insert_score(score_for(user.id(), "Math", 3), t0)
            .await
            .unwrap();
        repo.insert_score(score_for(user.id(), "Science", 4), t0 + Duration::minutes(5))
            .await
            .unwrap();

        let rows = repo.list_scores_for_user(user.id()).await.unwrap();
        let topics: Vec<_> = rows.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, vec!["Science", "Math"]);
    }

    #[tokio::test]
    async fn score_for_unknown_user_is_not_found() {
        let repo = InMemoryRepository::new();
        let res = repo
            .insert_score(score_for(UserId::new(9), "Math", 1), fixed_now())
            .await;
        assert!(matches!(res, Err(StorageError::NotFound)));
    }
}
