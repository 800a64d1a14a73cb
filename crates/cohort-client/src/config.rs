//! Messenger configuration.
//!
//! All settings default to the platform conventions: one-second minimum
//! voice clips, webm-first encoding, 1280x720 capture.

use cohort_media::{AudioCaptureConfig, CallConfig, RecorderConfig};

/// Tunables for the messenger component.
#[derive(Debug, Clone, Default)]
pub struct MessengerConfig {
    /// Voice recording session settings (minimum clip length, encoding
    /// preference order).
    pub recorder: RecorderConfig,

    /// Microphone settings used when recording voice messages.
    pub recording_audio: AudioCaptureConfig,

    /// Capture settings for video calls.
    pub call: CallConfig,
}
