//! # cohort-client
//!
//! The two presentation-facing components of the collaboration core: the
//! [`Messenger`] (direct/group chat, voice messages, video calls, course
//! invitations, study groups) and [`Notes`].  Both hold an in-memory view
//! synchronized against the shared [`state::AppState`] and emit domain
//! events over a tokio channel for an embedding UI to consume.

pub mod calls;
pub mod config;
pub mod events;
pub mod invitations;
pub mod messenger;
pub mod notes;
pub mod roster;
pub mod session;
pub mod state;
pub mod voice;

mod error;

pub use config::MessengerConfig;
pub use error::ClientError;
pub use events::ClientEvent;
pub use messenger::Messenger;
pub use notes::Notes;
pub use roster::Friend;
pub use session::{SessionProvider, StoredSession};
pub use state::{AppState, SharedState};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.  Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("cohort_client=debug,cohort_store=info,cohort_media=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
