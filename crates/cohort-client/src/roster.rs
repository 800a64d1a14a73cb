//! Friend roster and user directory.

use tracing::info;

use cohort_shared::{Presence, UserId};
use cohort_store::User;

use crate::error::Result;
use crate::messenger::Messenger;
use crate::state::lock;

/// A friend paired with their presence.
///
/// Presence starts out [`Presence::Unknown`] until a signal for the user
/// arrives; it is never guessed.
#[derive(Debug, Clone)]
pub struct Friend {
    pub user: User,
    pub presence: Presence,
}

impl Messenger {
    /// The signed-in user's friends, presence attached.
    pub fn friends(&self) -> Result<Vec<Friend>> {
        let guard = lock(&self.state)?;
        let me = guard.user.id.clone();
        let friends = guard
            .db
            .list_users()?
            .into_iter()
            .filter(|u| u.is_friend_of(&me))
            .map(|user| Friend {
                user,
                presence: Presence::default(),
            })
            .collect();
        Ok(friends)
    }

    /// Everyone who is not yet a friend and not the signed-in user.
    pub fn directory(&self) -> Result<Vec<User>> {
        let guard = lock(&self.state)?;
        let me = guard.user.id.clone();
        Ok(guard
            .db
            .list_users()?
            .into_iter()
            .filter(|u| u.id != me && !u.is_friend_of(&me))
            .collect())
    }

    /// Case-insensitive name filter over the friend roster.
    pub fn filter_friends(&self, query: &str) -> Result<Vec<Friend>> {
        let needle = query.to_lowercase();
        Ok(self
            .friends()?
            .into_iter()
            .filter(|f| f.user.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Case-insensitive name-or-email filter over the directory.
    pub fn filter_directory(&self, query: &str) -> Result<Vec<User>> {
        let needle = query.to_lowercase();
        Ok(self
            .directory()?
            .into_iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle)
                    || u.email.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Add a friend, both directions at once.  Returns false if the link
    /// already existed.  The in-memory user snapshot is refreshed from the
    /// store, and an attached session provider receives the full
    /// replacement record.
    pub fn add_friend(&mut self, other: &UserId) -> Result<bool> {
        let mut guard = lock(&self.state)?;
        let me = guard.user.id.clone();
        let added = guard.db.add_friend(&me, other)?;
        guard.user = guard.db.get_user(&me)?;
        let updated = guard.user.clone();
        drop(guard);

        if added {
            if let Some(session) = self.session.as_mut() {
                let guard = lock(&self.state)?;
                session.user_updated(&guard.db, &updated)?;
            }
            info!(friend = %other, "friend added");
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::messenger::tests::{alice, bob, messenger_for};
    use crate::state::lock;

    fn seed_bob(m: &Messenger) {
        lock(&m.state).unwrap().db.upsert_user(&bob()).unwrap();
    }

    #[test]
    fn directory_excludes_self_and_friends() {
        let mut m = messenger_for(alice());
        seed_bob(&m);

        assert_eq!(m.directory().unwrap().len(), 1);
        assert!(m.friends().unwrap().is_empty());

        assert!(m.add_friend(&UserId::new("bob")).unwrap());

        assert!(m.directory().unwrap().is_empty());
        let friends = m.friends().unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].user.id.as_str(), "bob");
        assert_eq!(friends[0].presence, Presence::Unknown);
    }

    #[test]
    fn add_friend_is_idempotent_and_refreshes_snapshot() {
        let mut m = messenger_for(alice());
        seed_bob(&m);

        assert!(m.add_friend(&UserId::new("bob")).unwrap());
        assert!(!m.add_friend(&UserId::new("bob")).unwrap());

        let me = m.me().unwrap();
        assert!(me.friends.iter().any(|f| f.as_str() == "bob"));
    }

    #[test]
    fn add_friend_unknown_user_is_not_found() {
        let mut m = messenger_for(alice());
        assert!(matches!(
            m.add_friend(&UserId::new("ghost")),
            Err(ClientError::Store(_))
        ));
    }

    #[test]
    fn session_provider_receives_the_replacement_record() {
        use crate::session::SessionProvider;
        use cohort_store::Database;
        use std::cell::RefCell;
        use std::rc::Rc;

        struct RecordingSession(Rc<RefCell<Vec<User>>>);

        impl SessionProvider for RecordingSession {
            fn current_user(&self, db: &Database) -> crate::error::Result<User> {
                Ok(db.local_user()?)
            }

            fn user_updated(&mut self, _db: &Database, user: &User) -> crate::error::Result<()> {
                self.0.borrow_mut().push(user.clone());
                Ok(())
            }
        }

        let mut m = messenger_for(alice());
        seed_bob(&m);
        let updates = Rc::new(RefCell::new(Vec::new()));
        m.attach_session(Box::new(RecordingSession(Rc::clone(&updates))));

        m.add_friend(&UserId::new("bob")).unwrap();
        m.add_friend(&UserId::new("bob")).unwrap();

        // Only the first call changed anything.
        let seen = updates.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].friends.contains(&UserId::new("bob")));
    }

    #[test]
    fn filters_are_case_insensitive() {
        let mut m = messenger_for(alice());
        seed_bob(&m);

        assert_eq!(m.filter_directory("BOB").unwrap().len(), 1);
        assert_eq!(m.filter_directory("@example").unwrap().len(), 1);
        assert!(m.filter_directory("zed").unwrap().is_empty());

        m.add_friend(&UserId::new("bob")).unwrap();
        assert_eq!(m.filter_friends("bO").unwrap().len(), 1);
    }
}
