//! Single-slot voice playback.
//!
//! At most one voice message plays at a time: starting another stops the
//! current one, toggling the same one pauses it.  The actual audio output
//! sits behind the [`AudioSink`] trait.

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Error loading voice message: {0}")]
    Load(String),

    #[error("Error playing voice message: {0}")]
    Play(String),
}

/// Audio output seam.  `play` receives the clip's handle and its encoded
/// bytes; a sink may decode the bytes directly or resolve the handle.
pub trait AudioSink {
    fn play(&mut self, uri: &str, data: &[u8]) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn stop(&mut self);
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackChange {
    Started,
    Paused,
}

/// The single playback slot.
pub struct VoicePlayer {
    sink: Box<dyn AudioSink>,
    playing: Option<Uuid>,
}

impl VoicePlayer {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            playing: None,
        }
    }

    /// The message currently playing, if any.
    pub fn now_playing(&self) -> Option<Uuid> {
        self.playing
    }

    /// Toggle playback of a voice message.
    ///
    /// Same message -> pause and clear the slot.  Different message -> stop
    /// whatever is playing and start the new one.  A failed start clears
    /// the slot before surfacing the error.
    pub fn toggle(
        &mut self,
        message_id: Uuid,
        uri: &str,
        data: &[u8],
    ) -> Result<PlaybackChange, PlaybackError> {
        if self.playing == Some(message_id) {
            self.sink.pause();
            self.playing = None;
            debug!(%message_id, "voice playback paused");
            return Ok(PlaybackChange::Paused);
        }

        if self.playing.is_some() {
            self.sink.stop();
            self.playing = None;
        }

        match self.sink.play(uri, data) {
            Ok(()) => {
                self.playing = Some(message_id);
                debug!(%message_id, "voice playback started");
                Ok(PlaybackChange::Started)
            }
            Err(e) => {
                warn!(%message_id, error = %e, "voice playback failed");
                Err(e)
            }
        }
    }

    /// Called when the sink reports the clip finished on its own.
    pub fn clip_ended(&mut self) {
        self.playing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SinkLog {
        events: Vec<String>,
        fail_next: bool,
    }

    struct StubSink(Rc<RefCell<SinkLog>>);

    impl AudioSink for StubSink {
        fn play(&mut self, uri: &str, data: &[u8]) -> Result<(), PlaybackError> {
            let mut log = self.0.borrow_mut();
            if log.fail_next {
                log.fail_next = false;
                return Err(PlaybackError::Load("bad clip".to_string()));
            }
            log.events.push(format!("play {uri} ({} bytes)", data.len()));
            Ok(())
        }

        fn pause(&mut self) {
            self.0.borrow_mut().events.push("pause".to_string());
        }

        fn stop(&mut self) {
            self.0.borrow_mut().events.push("stop".to_string());
        }
    }

    fn player() -> (VoicePlayer, Rc<RefCell<SinkLog>>) {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        (VoicePlayer::new(Box::new(StubSink(log.clone()))), log)
    }

    #[test]
    fn toggling_same_message_pauses() {
        let (mut player, log) = player();
        let id = Uuid::new_v4();

        assert_eq!(
            player.toggle(id, "mem://1", b"aa").unwrap(),
            PlaybackChange::Started
        );
        assert_eq!(player.now_playing(), Some(id));

        assert_eq!(
            player.toggle(id, "mem://1", b"aa").unwrap(),
            PlaybackChange::Paused
        );
        assert_eq!(player.now_playing(), None);
        assert_eq!(log.borrow().events, vec!["play mem://1 (2 bytes)", "pause"]);
    }

    #[test]
    fn starting_another_message_stops_the_current_one() {
        let (mut player, log) = player();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        player.toggle(first, "mem://1", b"a").unwrap();
        player.toggle(second, "mem://2", b"bb").unwrap();

        assert_eq!(player.now_playing(), Some(second));
        assert_eq!(
            log.borrow().events,
            vec!["play mem://1 (1 bytes)", "stop", "play mem://2 (2 bytes)"]
        );
    }

    #[test]
    fn failed_start_clears_the_slot() {
        let (mut player, log) = player();
        log.borrow_mut().fail_next = true;

        let err = player.toggle(Uuid::new_v4(), "mem://bad", b"x").unwrap_err();
        assert!(matches!(err, PlaybackError::Load(_)));
        assert_eq!(player.now_playing(), None);
    }

    #[test]
    fn natural_end_clears_the_slot() {
        let (mut player, _log) = player();
        let id = Uuid::new_v4();
        player.toggle(id, "mem://1", b"a").unwrap();

        player.clip_ended();
        assert_eq!(player.now_playing(), None);
    }
}
