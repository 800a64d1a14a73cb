//! Video call session: idle -> active -> idle.
//!
//! This is a local capture session only; no remote peer stream is ever
//! attached.  Toggles flip the corresponding track's enabled flag without
//! renegotiation, and ending the call always releases every track.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use cohort_shared::CallStatus;

use crate::capture::{
    AudioCaptureConfig, CaptureBackend, CaptureError, CaptureStream, TrackKind, VideoCaptureConfig,
};

#[derive(Debug, Clone, Default)]
pub struct CallConfig {
    pub audio: AudioCaptureConfig,
    pub video: VideoCaptureConfig,
}

/// What a finished call reports.  Only produced for calls that lasted at
/// least one whole second; shorter calls end silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSummary {
    pub duration: Duration,
    pub status: CallStatus,
}

impl CallSummary {
    pub fn duration_secs(&self) -> u32 {
        self.duration.as_secs() as u32
    }
}

/// An active call holding the live camera/microphone tracks.
pub struct CallSession {
    stream: CaptureStream,
    started_at: Instant,
    audio_enabled: bool,
    video_enabled: bool,
}

impl CallSession {
    /// Acquire camera + microphone and go active with both tracks enabled.
    pub fn start(
        backend: &mut dyn CaptureBackend,
        config: &CallConfig,
    ) -> Result<Self, CaptureError> {
        let stream = backend.acquire_audio_video(&config.audio, &config.video)?;
        info!(
            width = config.video.width,
            height = config.video.height,
            "call session started"
        );
        Ok(Self {
            stream,
            started_at: Instant::now(),
            audio_enabled: true,
            video_enabled: true,
        })
    }

    /// The local capture, for attachment to a preview surface.
    pub fn local_stream(&self) -> &CaptureStream {
        &self.stream
    }

    /// Wall-clock time since the call went active, for display timers.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn is_video_enabled(&self) -> bool {
        self.video_enabled
    }

    /// Flip the microphone track.  Returns the new state.
    pub fn toggle_audio(&mut self) -> bool {
        self.audio_enabled = !self.audio_enabled;
        if let Some(track) = self.stream.track(TrackKind::Audio) {
            track.set_enabled(self.audio_enabled);
        }
        debug!(enabled = self.audio_enabled, "call audio toggled");
        self.audio_enabled
    }

    /// Flip the camera track.  Returns the new state.
    pub fn toggle_video(&mut self) -> bool {
        self.video_enabled = !self.video_enabled;
        if let Some(track) = self.stream.track(TrackKind::Video) {
            track.set_enabled(self.video_enabled);
        }
        debug!(enabled = self.video_enabled, "call video toggled");
        self.video_enabled
    }

    /// End the call, releasing every track unconditionally.
    ///
    /// Duration is floored to whole seconds; a call that never reached one
    /// second yields no summary.
    pub fn end(self) -> Option<CallSummary> {
        self.stream.stop_all();
        let duration = Duration::from_secs(self.started_at.elapsed().as_secs());

        if duration.is_zero() {
            debug!("call ended before one second, no summary");
            return None;
        }

        info!(?duration, "call session ended");
        Some(CallSummary {
            duration,
            status: CallStatus::Completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MediaTrack;
    use cohort_shared::AudioFormat;

    struct StubBackend {
        last_stream: Option<CaptureStream>,
    }

    impl CaptureBackend for StubBackend {
        fn acquire_audio(
            &mut self,
            _config: &AudioCaptureConfig,
        ) -> Result<CaptureStream, CaptureError> {
            Err(CaptureError::DeviceNotFound)
        }

        fn acquire_audio_video(
            &mut self,
            _audio: &AudioCaptureConfig,
            _video: &VideoCaptureConfig,
        ) -> Result<CaptureStream, CaptureError> {
            let stream = CaptureStream::new(vec![
                MediaTrack::new(TrackKind::Audio),
                MediaTrack::new(TrackKind::Video),
            ]);
            self.last_stream = Some(stream.clone());
            Ok(stream)
        }

        fn supports_format(&self, _format: AudioFormat) -> bool {
            true
        }
    }

    fn active_session(backend: &mut StubBackend) -> CallSession {
        CallSession::start(backend, &CallConfig::default()).unwrap()
    }

    #[test]
    fn starts_with_both_tracks_enabled() {
        let mut backend = StubBackend { last_stream: None };
        let session = active_session(&mut backend);

        assert!(session.is_audio_enabled());
        assert!(session.is_video_enabled());
        let stream = session.local_stream();
        assert!(stream.track(TrackKind::Audio).unwrap().is_enabled());
        assert!(stream.track(TrackKind::Video).unwrap().is_enabled());
    }

    #[test]
    fn toggles_mirror_the_track_flags() {
        let mut backend = StubBackend { last_stream: None };
        let mut session = active_session(&mut backend);

        assert!(!session.toggle_video());
        assert!(!session
            .local_stream()
            .track(TrackKind::Video)
            .unwrap()
            .is_enabled());
        // Audio untouched by the video toggle.
        assert!(session.is_audio_enabled());

        assert!(session.toggle_video());
        assert!(!session.toggle_audio());
        assert!(!session
            .local_stream()
            .track(TrackKind::Audio)
            .unwrap()
            .is_enabled());
    }

    #[test]
    fn instant_end_yields_no_summary_but_releases_tracks() {
        let mut backend = StubBackend { last_stream: None };
        let session = active_session(&mut backend);

        assert!(session.end().is_none());
        let stream = backend.last_stream.unwrap();
        assert!(stream.tracks().iter().all(|t| !t.is_live()));
    }

    #[test]
    fn completed_call_reports_floored_duration() {
        let mut backend = StubBackend { last_stream: None };
        let session = active_session(&mut backend);

        std::thread::sleep(Duration::from_millis(1050));
        let summary = session.end().expect("call outlived one second");
        assert_eq!(summary.status, CallStatus::Completed);
        assert_eq!(summary.duration_secs(), 1);
    }
}
