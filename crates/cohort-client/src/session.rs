//! Seam to the platform's authentication/session provider.
//!
//! The collaboration core only consumes the signed-in user's
//! `{id, name, email, friends}` and hands back a full replacement record
//! after profile mutations such as adding a friend.

use cohort_store::{Database, User};

use crate::error::Result;

/// External authentication collaborator.
pub trait SessionProvider {
    /// Resolve the signed-in user.
    fn current_user(&self, db: &Database) -> Result<User>;

    /// Receive the full replacement record after a profile mutation.
    fn user_updated(&mut self, db: &Database, user: &User) -> Result<()>;
}

/// Default provider backed by the store's local-user slot, for setups
/// without an external identity service.
#[derive(Debug, Default)]
pub struct StoredSession;

impl SessionProvider for StoredSession {
    fn current_user(&self, db: &Database) -> Result<User> {
        Ok(db.local_user()?)
    }

    fn user_updated(&mut self, db: &Database, user: &User) -> Result<()> {
        db.set_local_user(&user.id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::state::AppState;
    use cohort_store::StoreError;

    #[test]
    fn stored_session_resolves_the_local_user_slot() {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("alice", "Alice", "alice@example.edu");
        db.upsert_user(&user).unwrap();
        db.set_local_user(&user.id).unwrap();

        let state = AppState::sign_in(db, &StoredSession).unwrap();
        assert_eq!(state.user.id, user.id);

        // A profile mutation hands the replacement record back in.
        let other = User::new("bob", "Bob", "bob@example.edu");
        state.db.upsert_user(&other).unwrap();
        let mut session = StoredSession;
        session.user_updated(&state.db, &other).unwrap();
        assert_eq!(session.current_user(&state.db).unwrap().id, other.id);
    }

    #[test]
    fn sign_in_without_a_stored_session_fails() {
        let db = Database::open_in_memory().unwrap();
        let err = AppState::sign_in(db, &StoredSession).unwrap_err();
        assert!(matches!(err, ClientError::Store(StoreError::NotFound)));
    }
}
