//! Session persistence.
//!
//! A session survives restarts as two storage entries: the serialized
//! profile under [`USER_KEY`] and the token under [`TOKEN_KEY`]. They are
//! written and removed together. Anything else found at startup (one entry
//! without the other, a profile that no longer parses) is cleared and the
//! client starts anonymous.

use std::sync::Arc;

use relux_core::{AuthToken, Session, UserProfile};
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError, TOKEN_KEY, USER_KEY};

/// Reads and writes the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Read the persisted session.
    ///
    /// Never fails: unreadable or partial state is removed and reported as
    /// anonymous.
    #[must_use]
    pub fn restore(&self) -> Session {
        let user = self.storage.get(USER_KEY);
        let token = self.storage.get(TOKEN_KEY);

        match (user, token) {
            (Ok(Some(user)), Ok(Some(token))) => {
                match serde_json::from_str::<UserProfile>(&user) {
                    Ok(profile) => {
                        let session = Session::authenticated(profile, AuthToken::new(token));
                        if session.is_authenticated() {
                            debug!("Restored persisted session");
                            return session;
                        }
                        warn!("Persisted token is blank, clearing session");
                    }
                    Err(e) => warn!(error = %e, "Persisted profile is unreadable, clearing session"),
                }
            }
            (Ok(None), Ok(None)) => return Session::Anonymous,
            (Ok(_), Ok(_)) => warn!("Persisted session is incomplete, clearing it"),
            (Err(e), _) | (_, Err(e)) => warn!(error = %e, "Could not read persisted session"),
        }

        if let Err(e) = self.clear() {
            warn!(error = %e, "Could not clear persisted session");
        }
        Session::Anonymous
    }

    /// Write both entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either entry cannot be written.
    pub fn persist(&self, user: &UserProfile, token: &AuthToken) -> Result<(), StorageError> {
        let profile = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &profile)?;
        self.storage.set(TOKEN_KEY, token.expose())?;
        debug!(user_id = %user.id, "Persisted session");
        Ok(())
    }

    /// Write the entries for `session`, or remove them when anonymous.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        match session {
            Session::Authenticated { user, token } => self.persist(user, token),
            Session::Anonymous => self.clear(),
        }
    }

    /// Remove both entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        // Remove both even if the first fails
        let user = self.storage.remove(USER_KEY);
        let token = self.storage.remove(TOKEN_KEY);
        user.and(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use relux_core::UserId;

    fn user() -> UserProfile {
        UserProfile {
            id: UserId::new(7),
            name: "Maria Clara".to_string(),
            email: "mc@relux.ph".to_string(),
        }
    }

    fn store() -> (MemoryStore, SessionStore) {
        let memory = MemoryStore::new();
        let sessions = SessionStore::new(Arc::new(memory.clone()));
        (memory, sessions)
    }

    #[test]
    fn test_persist_then_restore() {
        let (memory, sessions) = store();
        sessions.persist(&user(), &AuthToken::new("tok")).unwrap();
        assert_eq!(memory.len(), 2);

        let session = sessions.restore();
        assert_eq!(session.user(), Some(&user()));
        assert_eq!(session.token().map(AuthToken::expose), Some("tok"));
    }

    #[test]
    fn test_empty_storage_is_anonymous() {
        let (_, sessions) = store();
        assert_eq!(sessions.restore(), Session::Anonymous);
    }

    #[test]
    fn test_corrupt_profile_clears_both_entries() {
        let (memory, sessions) = store();
        memory.set(USER_KEY, "{not json").unwrap();
        memory.set(TOKEN_KEY, "tok").unwrap();

        assert_eq!(sessions.restore(), Session::Anonymous);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_orphan_entry_is_removed() {
        let (memory, sessions) = store();
        memory.set(TOKEN_KEY, "tok").unwrap();

        assert_eq!(sessions.restore(), Session::Anonymous);
        assert!(memory.is_empty());

        memory
            .set(USER_KEY, &serde_json::to_string(&user()).unwrap())
            .unwrap();
        assert_eq!(sessions.restore(), Session::Anonymous);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_clear_removes_both() {
        let (memory, sessions) = store();
        sessions.save(&Session::authenticated(user(), AuthToken::new("tok"))).unwrap();
        sessions.save(&Session::Anonymous).unwrap();
        assert!(memory.is_empty());
    }
}
