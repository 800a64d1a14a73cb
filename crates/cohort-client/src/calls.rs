//! Video call lifecycle.
//!
//! One call at a time, direct chats only.  A `VideoCall` message marks the
//! start; ending the call posts a second one carrying the floored duration,
//! unless the call lasted under a second.

use std::time::Duration;

use tracing::info;

use cohort_media::{CallSession, CallSummary, CaptureBackend, CaptureStream};
use cohort_shared::ChatTarget;
use cohort_store::{CallPhase, Message, MessageBody};

use crate::error::{ClientError, Result};
use crate::events::{emit, ClientEvent};
use crate::messenger::{ActiveCall, Messenger};

impl Messenger {
    /// Start a video call with the selected direct-chat peer.
    pub fn start_video_call(&mut self, backend: &mut dyn CaptureBackend) -> Result<()> {
        let peer = match self.require_selected()? {
            ChatTarget::Direct(peer) => peer,
            ChatTarget::Group(_) => return Err(ClientError::DirectChatOnly),
        };
        if self.call.is_some() {
            return Err(ClientError::CallInProgress);
        }

        let session = CallSession::start(backend, &self.config.call)?;
        self.call = Some(ActiveCall {
            session,
            peer: peer.clone(),
        });

        let me = self.me()?;
        let message = Message::new(
            me.id,
            me.name,
            ChatTarget::Direct(peer.clone()),
            MessageBody::VideoCall {
                phase: CallPhase::Started,
            },
        );
        self.append_message(message)?;
        self.emit_call_state()?;

        info!(peer = %peer, "video call started");
        Ok(())
    }

    /// End the active call.  Returns the summary, or `None` if the call was
    /// under a second (no ended message is posted in that case).
    pub fn end_video_call(&mut self) -> Result<Option<CallSummary>> {
        let active = self.call.take().ok_or(ClientError::NoActiveCall)?;
        let summary = active.session.end();
        self.emit_call_state()?;

        let Some(summary) = summary else {
            info!(peer = %active.peer, "video call ended, too short to record");
            return Ok(None);
        };

        // The ended message goes to the call's peer, not the current
        // selection, which may have changed mid-call.
        let me = self.me()?;
        let message = Message::new(
            me.id,
            me.name,
            ChatTarget::Direct(active.peer.clone()),
            MessageBody::VideoCall {
                phase: CallPhase::Ended {
                    duration_secs: summary.duration_secs(),
                    status: summary.status,
                },
            },
        );
        self.append_message(message)?;

        info!(peer = %active.peer, duration = summary.duration_secs(), "video call ended");
        Ok(Some(summary))
    }

    /// Toggle the local microphone.  Returns the new enabled state.
    pub fn toggle_call_audio(&mut self) -> Result<bool> {
        let active = self.call.as_mut().ok_or(ClientError::NoActiveCall)?;
        let enabled = active.session.toggle_audio();
        self.emit_call_state()?;
        Ok(enabled)
    }

    /// Toggle the local camera.  Returns the new enabled state.
    pub fn toggle_call_video(&mut self) -> Result<bool> {
        let active = self.call.as_mut().ok_or(ClientError::NoActiveCall)?;
        let enabled = active.session.toggle_video();
        self.emit_call_state()?;
        Ok(enabled)
    }

    pub fn in_call(&self) -> bool {
        self.call.is_some()
    }

    /// Elapsed time of the active call.
    pub fn call_elapsed(&self) -> Option<Duration> {
        self.call.as_ref().map(|c| c.session.elapsed())
    }

    /// Local capture of the active call, for a preview surface.
    pub fn call_stream(&self) -> Option<&CaptureStream> {
        self.call.as_ref().map(|c| c.session.local_stream())
    }

    fn emit_call_state(&self) -> Result<()> {
        let payload = match &self.call {
            Some(active) => crate::events::CallStatePayload {
                in_call: true,
                audio_enabled: active.session.is_audio_enabled(),
                video_enabled: active.session.is_video_enabled(),
            },
            None => crate::events::CallStatePayload {
                in_call: false,
                audio_enabled: false,
                video_enabled: false,
            },
        };
        emit(&self.events, ClientEvent::CallStateChanged(payload));
        Ok(())
    }
}
