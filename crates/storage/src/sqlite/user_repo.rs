use quiz_core::model::User;

use super::SqliteRepository;
use super::mapping::{user_from_row, write_error};
use crate::repository::{NewUserRecord, StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, username, email, password_hash, created_at
            ",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, password_hash, created_at
            FROM users WHERE email = ?1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, password_hash, created_at
            FROM users WHERE email = ?1 OR username = ?2
            LIMIT 1
            ",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }
}
