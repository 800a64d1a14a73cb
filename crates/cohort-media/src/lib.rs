//! # cohort-media
//!
//! Capture and playback lifecycle for voice messages and video calls,
//! with no device I/O of its own.  Real microphones, cameras and speakers
//! sit behind the [`CaptureBackend`] and [`AudioSink`] traits so the
//! session state machines can be driven (and tested) without hardware.

pub mod call;
pub mod capture;
pub mod playback;
pub mod recorder;

pub use call::{CallConfig, CallSession, CallSummary};
pub use capture::{
    AudioCaptureConfig, CaptureBackend, CaptureError, CaptureStream, MediaTrack, TrackKind,
    VideoCaptureConfig,
};
pub use playback::{AudioSink, PlaybackChange, PlaybackError, VoicePlayer};
pub use recorder::{RecordedClip, RecorderConfig, RecorderError, VoiceRecorder};
