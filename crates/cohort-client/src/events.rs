//! Domain events emitted toward the embedding UI.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use cohort_shared::InviteStatus;
use cohort_store::Message;

/// Call session flags, mirrored on every transition.
#[derive(Debug, Clone, Serialize)]
pub struct CallStatePayload {
    pub in_call: bool,
    pub audio_enabled: bool,
    pub video_enabled: bool,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A message was appended to the store (any kind, any chat).
    MessageAppended { message: Message },

    /// The call session started, ended, or had a track toggled.
    CallStateChanged(CallStatePayload),

    /// The voice recording session started or stopped.
    RecordingStateChanged { recording: bool },

    /// The playback slot changed.
    PlaybackChanged { playing: Option<Uuid> },

    /// An invitation transitioned.
    InvitationUpdated { id: Uuid, status: InviteStatus },
}

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

/// Best-effort emit: a missing or closed channel drops the event.
pub(crate) fn emit(tx: &Option<EventSender>, event: ClientEvent) {
    if let Some(tx) = tx {
        if tx.send(event).is_err() {
            tracing::debug!("event channel closed, dropping event");
        }
    }
}
