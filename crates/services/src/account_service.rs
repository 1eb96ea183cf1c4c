use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use quiz_core::Clock;
use quiz_core::model::{NewUser, UserProfile};
use storage::repository::{NewUserRecord, StorageError, UserRepository};
use tracing::info;

use crate::error::AccountError;

/// Registration and login over a `UserRepository`.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Create an account with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AlreadyExists` if the email or username is taken,
    /// `AccountError::Invalid` for blank input, and storage or hashing errors otherwise.
    pub async fn register(&self, draft: NewUser) -> Result<UserProfile, AccountError> {
        let draft = draft.validate()?;

        if self
            .users
            .find_by_email_or_username(&draft.email, &draft.username)
            .await?
            .is_some()
        {
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = hash_password(&draft.password)?;
        let user = self
            .users
            .insert_user(NewUserRecord {
                username: draft.username,
                email: draft.email,
                password_hash,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|e| match e {
                StorageError::Conflict => AccountError::AlreadyExists,
                other => AccountError::Storage(other),
            })?;

        info!(user_id = %user.id(), "registered user");
        Ok(user.profile())
    }

    /// Check credentials and return the account's public profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for an unknown email or wrong
    /// password, and storage or hashing errors otherwise.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AccountError> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(password, user.password_hash())? {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user.profile())
    }
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AccountError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("hunter2", &a).unwrap());
        assert!(!verify_password("hunter3", &a).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", "not-a-phc-string"),
            Err(AccountError::Hashing(_))
        ));
    }
}
