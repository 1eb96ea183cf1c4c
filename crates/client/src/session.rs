use std::sync::Arc;

use quiz_core::model::UserProfile;
use tracing::warn;

use crate::error::ClientError;
use crate::kv::KeyValueStore;

/// Storage key for the logged-in user.
pub const USER_KEY: &str = "user";

/// The logged-in user, persisted across runs.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    user: Option<UserProfile>,
}

impl Session {
    /// Restore a previously saved user, if any.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let user = match store.get(USER_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw)
                .map_err(|e| warn!(error = %e, "stored user is malformed, ignoring"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read stored user");
                None
            }
        };
        Self { store, user }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// # Errors
    ///
    /// Returns `ClientError` if the user cannot be persisted.
    pub fn sign_in(&mut self, user: UserProfile) -> Result<(), ClientError> {
        let raw = serde_json::to_string(&user)?;
        self.store.set(USER_KEY, &raw)?;
        self.user = Some(user);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ClientError` if the stored user cannot be removed.
    pub fn sign_out(&mut self) -> Result<(), ClientError> {
        self.user = None;
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use quiz_core::model::UserId;

    #[test]
    fn signed_in_user_is_restored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut session = Session::load(Arc::clone(&store));
        assert!(session.user().is_none());

        let alice = UserProfile {
            id: UserId::new(1),
            username: "alice".into(),
            email: "alice@example.com".into(),
        };
        session.sign_in(alice.clone()).unwrap();
        assert_eq!(Session::load(Arc::clone(&store)).user(), Some(&alice));

        session.sign_out().unwrap();
        assert!(Session::load(store).user().is_none());
    }
}
