use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username is required")]
    EmptyUsername,

    #[error("a valid email is required")]
    InvalidEmail,

    #[error("password is required")]
    EmptyPassword,
}

/// Registration input before the password is hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Trim identifying fields and reject blank input.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when the username or password is blank, or the
    /// email has no `@`.
    pub fn validate(self) -> Result<Self, UserError> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();
        if username.is_empty() {
            return Err(UserError::EmptyUsername);
        }
        if !email.contains('@') {
            return Err(UserError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(UserError::EmptyPassword);
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

/// A persisted account, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        username: String,
        email: String,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The view of the account that leaves the server.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public account fields, as returned by register/login and kept by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(username: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn validate_trims_identity_fields() {
        let user = draft("  ada ", " ada@example.com ", "pw").validate().unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn validate_rejects_blank_input() {
        assert_eq!(
            draft(" ", "a@b.c", "pw").validate(),
            Err(UserError::EmptyUsername)
        );
        assert_eq!(
            draft("ada", "nope", "pw").validate(),
            Err(UserError::InvalidEmail)
        );
        assert_eq!(
            draft("ada", "a@b.c", "").validate(),
            Err(UserError::EmptyPassword)
        );
    }

    #[test]
    fn profile_omits_password_hash() {
        let user = User::from_persisted(
            UserId::new(3),
            "ada".into(),
            "ada@example.com".into(),
            "$argon2id$secret".into(),
            fixed_now(),
        );
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json.get("password_hash").is_none());
    }
}
