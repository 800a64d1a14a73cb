//! Application state shared by the messenger and notes components.
//!
//! [`AppState`] is wrapped in `Arc<Mutex<>>` so both components (and an
//! embedding shell) can reach the database and the signed-in user.

use std::sync::{Arc, Mutex, MutexGuard};

use cohort_store::{Database, User};

use crate::error::{ClientError, Result};
use crate::session::SessionProvider;

/// Central application state.
#[derive(Debug)]
pub struct AppState {
    /// Handle to the local SQLite database.
    pub db: Database,

    /// The signed-in user, mirrored from the session provider.
    pub user: User,
}

/// Shared handle passed to every component.
pub type SharedState = Arc<Mutex<AppState>>;

impl AppState {
    /// Resolve the signed-in user through the session provider and build
    /// the shared state.
    pub fn sign_in(db: Database, session: &dyn SessionProvider) -> Result<Self> {
        let user = session.current_user(&db)?;
        tracing::info!(user = %user.id, "session restored");
        Ok(Self { db, user })
    }

    /// Build state for an explicit user, registering them in the directory
    /// and the local-user slot.  Used by tests and demos.
    pub fn with_user(db: Database, user: User) -> Result<Self> {
        db.upsert_user(&user)?;
        db.set_local_user(&user.id)?;
        Ok(Self { db, user })
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

/// Lock the shared state, mapping a poisoned lock to a client error.
pub(crate) fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>> {
    state.lock().map_err(|_| ClientError::StatePoisoned)
}
