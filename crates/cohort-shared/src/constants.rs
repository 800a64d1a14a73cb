use std::time::Duration;

use crate::types::AudioFormat;

/// Application name
pub const APP_NAME: &str = "Cohort";

/// Shortest voice clip worth keeping; anything under this is discarded on
/// stop without persisting a clip or sending a message.
pub const MIN_VOICE_CLIP: Duration = Duration::from_secs(1);

/// Length a group chat's last-message preview is truncated to.
pub const GROUP_PREVIEW_LEN: usize = 50;

/// Recording format negotiation order, most preferred first.
pub const AUDIO_FORMAT_PREFERENCE: [AudioFormat; 3] =
    [AudioFormat::Webm, AudioFormat::Mp4, AudioFormat::Wav];

/// Default capture resolution for calls.
pub const DEFAULT_VIDEO_WIDTH: u32 = 1280;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 720;
