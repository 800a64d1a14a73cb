//! Device acquisition seam.
//!
//! A [`CaptureBackend`] hands out [`CaptureStream`]s of live tracks.  The
//! track flags are shared atomics so a backend's capture callback can honor
//! enable/stop from the session side without locking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use cohort_shared::constants::{DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH};
use cohort_shared::AudioFormat;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Device access denied. Please allow permissions and try again.")]
    PermissionDenied,

    #[error("No capture device found. Please check your devices.")]
    DeviceNotFound,

    #[error("Unable to access capture device: {0}")]
    Backend(String),
}

/// Microphone acquisition settings.
#[derive(Debug, Clone)]
pub struct AudioCaptureConfig {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioCaptureConfig {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Camera acquisition settings.
#[derive(Debug, Clone)]
pub struct VideoCaptureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for VideoCaptureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live device track.  `enabled` gates whether the backend should deliver
/// data; `live` goes false exactly once, when the track is stopped.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    kind: TrackKind,
    enabled: Arc<AtomicBool>,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            enabled: Arc::new(AtomicBool::new(true)),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        tracing::debug!(kind = ?self.kind, enabled, "track enabled state changed");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Release the underlying device.  Irreversible.
    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }
}

/// The set of tracks acquired by one backend call.
#[derive(Debug, Clone, Default)]
pub struct CaptureStream {
    tracks: Vec<MediaTrack>,
}

impl CaptureStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn track(&self, kind: TrackKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == kind)
    }

    /// Stop every track unconditionally.
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
        tracing::debug!(tracks = self.tracks.len(), "capture stream stopped");
    }
}

/// Acquires device tracks.  Implemented by platform layers and by test
/// stubs; acquisition failures use the [`CaptureError`] taxonomy so callers
/// can show distinct messages for denied vs. missing devices.
pub trait CaptureBackend {
    /// Acquire a microphone track.
    fn acquire_audio(&mut self, config: &AudioCaptureConfig)
        -> Result<CaptureStream, CaptureError>;

    /// Acquire camera + microphone tracks.
    fn acquire_audio_video(
        &mut self,
        audio: &AudioCaptureConfig,
        video: &VideoCaptureConfig,
    ) -> Result<CaptureStream, CaptureError>;

    /// Whether the backend's recorder can encode the given format.
    fn supports_format(&self, format: AudioFormat) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_flags() {
        let track = MediaTrack::new(TrackKind::Audio);
        assert!(track.is_enabled());
        assert!(track.is_live());

        track.set_enabled(false);
        assert!(!track.is_enabled());

        track.stop();
        assert!(!track.is_live());
    }

    #[test]
    fn stop_all_releases_every_track() {
        let stream = CaptureStream::new(vec![
            MediaTrack::new(TrackKind::Audio),
            MediaTrack::new(TrackKind::Video),
        ]);
        stream.stop_all();
        assert!(stream.tracks().iter().all(|t| !t.is_live()));
    }
}
