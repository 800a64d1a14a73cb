//! Voice recording session: idle -> recording -> idle.
//!
//! On start the recorder acquires a microphone and negotiates the first
//! encoding the backend supports from the configured preference order.
//! On stop all tracks are released unconditionally; clips under the
//! configured minimum duration are discarded.

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tracing::{debug, info, warn};

use cohort_shared::constants::{AUDIO_FORMAT_PREFERENCE, MIN_VOICE_CLIP};
use cohort_shared::AudioFormat;

use crate::capture::{AudioCaptureConfig, CaptureBackend, CaptureError, CaptureStream};

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("No supported audio encoding available")]
    NoSupportedFormat,

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Recording too short. Please record for at least 1 second.")]
    ClipTooShort,
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Clips shorter than this are discarded on stop.
    pub min_clip: Duration,
    /// Encoding negotiation order, most preferred first.
    pub format_preference: Vec<AudioFormat>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_clip: MIN_VOICE_CLIP,
            format_preference: AUDIO_FORMAT_PREFERENCE.to_vec(),
        }
    }
}

/// A finished recording ready to be persisted and attached to a message.
#[derive(Debug, Clone)]
pub struct RecordedClip {
    pub format: AudioFormat,
    pub duration: Duration,
    pub data: Bytes,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl RecordedClip {
    /// Duration floored to whole seconds, the unit stored and displayed.
    pub fn duration_secs(&self) -> u32 {
        self.duration.as_secs() as u32
    }
}

struct ActiveRecording {
    stream: CaptureStream,
    format: AudioFormat,
    started_at: Instant,
    buffer: BytesMut,
}

/// The voice recording session state machine.
pub struct VoiceRecorder {
    config: RecorderConfig,
    active: Option<ActiveRecording>,
}

impl VoiceRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Wall-clock time since the recording started, for display timers.
    pub fn elapsed(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.started_at.elapsed())
    }

    pub fn format(&self) -> Option<AudioFormat> {
        self.active.as_ref().map(|a| a.format)
    }

    /// Acquire the microphone and begin buffering.
    pub fn start(
        &mut self,
        backend: &mut dyn CaptureBackend,
        audio: &AudioCaptureConfig,
    ) -> Result<(), RecorderError> {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        let format = self
            .config
            .format_preference
            .iter()
            .copied()
            .find(|f| backend.supports_format(*f))
            .ok_or(RecorderError::NoSupportedFormat)?;

        let stream = backend.acquire_audio(audio)?;

        info!(format = %format, "voice recording started");
        self.active = Some(ActiveRecording {
            stream,
            format,
            started_at: Instant::now(),
            buffer: BytesMut::new(),
        });
        Ok(())
    }

    /// Append a chunk of encoded audio.  Empty chunks are ignored; chunks
    /// arriving while idle are dropped (a stop can race the last delivery).
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        match &mut self.active {
            Some(active) if !chunk.is_empty() => active.buffer.extend_from_slice(chunk),
            Some(_) => {}
            None => warn!(len = chunk.len(), "dropping chunk received while idle"),
        }
    }

    /// Stop recording and release the microphone.
    ///
    /// The tracks are stopped whatever the outcome.  A clip shorter than
    /// the configured minimum is discarded with [`RecorderError::ClipTooShort`];
    /// nothing is persisted and no message should be sent for it.
    pub fn stop(&mut self) -> Result<RecordedClip, RecorderError> {
        let active = self.active.take().ok_or(RecorderError::NotRecording)?;
        let duration = active.started_at.elapsed();

        active.stream.stop_all();

        if duration < self.config.min_clip {
            debug!(?duration, "discarding too-short recording");
            return Err(RecorderError::ClipTooShort);
        }

        info!(?duration, bytes = active.buffer.len(), "voice recording kept");
        Ok(RecordedClip {
            format: active.format,
            duration,
            data: active.buffer.freeze(),
            recorded_at: chrono::Utc::now(),
        })
    }
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}
