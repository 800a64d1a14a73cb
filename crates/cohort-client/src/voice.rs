//! Voice messages: record with the microphone, persist the clip, post a
//! `Voice` message, and play clips back one at a time.

use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use cohort_media::{CaptureBackend, PlaybackChange, RecorderError};
use cohort_shared::AudioFormat;
use cohort_store::{Message, MessageBody, VoiceClip};

use crate::error::{ClientError, Result};
use crate::events::{emit, ClientEvent};
use crate::messenger::Messenger;
use crate::state::lock;

impl Messenger {
    /// Start recording a voice message for the selected chat.
    pub fn start_voice_recording(&mut self, backend: &mut dyn CaptureBackend) -> Result<()> {
        self.require_selected()?;
        self.recorder
            .start(backend, &self.config.recording_audio)?;
        emit(
            &self.events,
            ClientEvent::RecordingStateChanged { recording: true },
        );
        Ok(())
    }

    /// Feed a chunk of encoded audio from the capture pipeline.
    pub fn push_audio_chunk(&mut self, chunk: &[u8]) {
        self.recorder.push_chunk(chunk);
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// How long the current recording has been running.
    pub fn recording_elapsed(&self) -> Option<Duration> {
        self.recorder.elapsed()
    }

    /// Stop recording and, if the clip is long enough, persist it and post
    /// a voice message to the selected chat.
    ///
    /// Clips shorter than the minimum are discarded entirely; the device is
    /// released either way.
    pub fn stop_voice_recording(&mut self) -> Result<Message> {
        let target = self.require_selected()?;
        let outcome = self.recorder.stop();
        emit(
            &self.events,
            ClientEvent::RecordingStateChanged { recording: false },
        );

        let recorded = match outcome {
            Ok(clip) => clip,
            Err(e @ RecorderError::ClipTooShort) => {
                warn!(error = %e, "voice clip discarded");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let clip_id = Uuid::new_v4();
        let clip = VoiceClip {
            id: clip_id,
            uri: format!("clip://{clip_id}"),
            duration_secs: recorded.duration_secs(),
            format: recorded.format,
            recorded_at: recorded.recorded_at,
        };
        lock(&self.state)?.db.insert_clip(&clip, &recorded.data)?;

        let me = self.me()?;
        let message = Message::new(
            me.id,
            me.name,
            target,
            MessageBody::Voice {
                clip_id: clip.id,
                duration_secs: clip.duration_secs,
            },
        );
        self.append_message(message.clone())?;

        info!(clip = %clip.id, duration = clip.duration_secs, "voice message sent");
        Ok(message)
    }

    /// Toggle playback of a voice message.  Only one clip plays at a time;
    /// toggling a different message stops the current one first.
    pub fn toggle_voice_playback(&mut self, message_id: Uuid) -> Result<PlaybackChange> {
        let message = lock(&self.state)?.db.get_message(message_id)?;
        let clip_id = match message.body {
            MessageBody::Voice { clip_id, .. } => clip_id,
            _ => return Err(ClientError::NotVoiceMessage),
        };
        let (clip, data) = {
            let guard = lock(&self.state)?;
            (guard.db.get_clip(clip_id)?, guard.db.get_clip_data(clip_id)?)
        };

        let change = self.player.toggle(message_id, &clip.uri, &data)?;
        emit(
            &self.events,
            ClientEvent::PlaybackChanged {
                playing: self.player.now_playing(),
            },
        );
        Ok(change)
    }

    /// The voice message currently playing, if any.
    pub fn now_playing(&self) -> Option<Uuid> {
        self.player.now_playing()
    }

    /// Negotiated recording format, while a recording is active.
    pub fn recording_format(&self) -> Option<AudioFormat> {
        self.recorder.format()
    }
}
