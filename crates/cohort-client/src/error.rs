use thiserror::Error;

use cohort_media::{CaptureError, PlaybackError, RecorderError};
use cohort_store::StoreError;

/// Errors surfaced to the embedding UI.  The `#[error]` strings are
/// written to be shown to the user directly.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("No chat selected")]
    NoChatSelected,

    #[error("Message text must not be empty")]
    EmptyMessage,

    #[error("Note title and content must not be empty")]
    EmptyNote,

    #[error("A group needs a name and at least one member")]
    InvalidGroup,

    #[error("Only available in direct chats")]
    DirectChatOnly,

    #[error("A call is already active")]
    CallInProgress,

    #[error("No active call")]
    NoActiveCall,

    #[error("Not a voice message")]
    NotVoiceMessage,

    #[error("State lock poisoned")]
    StatePoisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
