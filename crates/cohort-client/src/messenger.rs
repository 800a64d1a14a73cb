//! The messaging/collaboration component.
//!
//! Owns the selected chat and its in-memory conversation view, the voice
//! recorder/player sessions, and the active call.  Every mutation writes
//! through to the store first, then updates the view optimistically.

use std::sync::Arc;

use tracing::info;

use cohort_media::{AudioSink, CallSession, VoicePlayer, VoiceRecorder};
use cohort_shared::{ChatTarget, UserId};
use cohort_store::{GroupChat, Message, MessageBody, User};

use crate::config::MessengerConfig;
use crate::error::{ClientError, Result};
use crate::events::{emit, ClientEvent, EventReceiver, EventSender};
use crate::session::SessionProvider;
use crate::state::{lock, SharedState};

pub(crate) struct ActiveCall {
    pub session: CallSession,
    /// The peer the call was started with; end-of-call messages go here
    /// even if the selection changed mid-call.
    pub peer: UserId,
}

/// The messaging component.
pub struct Messenger {
    pub(crate) state: SharedState,
    pub(crate) config: MessengerConfig,
    pub(crate) events: Option<EventSender>,
    pub(crate) session: Option<Box<dyn SessionProvider>>,
    selected: Option<ChatTarget>,
    messages: Vec<Message>,
    pub(crate) recorder: VoiceRecorder,
    pub(crate) player: VoicePlayer,
    pub(crate) call: Option<ActiveCall>,
}

impl Messenger {
    pub fn new(state: SharedState, config: MessengerConfig, sink: Box<dyn AudioSink>) -> Self {
        let recorder = VoiceRecorder::new(config.recorder.clone());
        Self {
            state,
            config,
            events: None,
            session: None,
            selected: None,
            messages: Vec::new(),
            recorder,
            player: VoicePlayer::new(sink),
            call: None,
        }
    }

    /// Open the event channel.  Events emitted before the first call are
    /// dropped.
    pub fn subscribe(&mut self) -> EventReceiver {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Attach the auth collaborator that receives profile updates.
    pub fn attach_session(&mut self, session: Box<dyn SessionProvider>) {
        self.session = Some(session);
    }

    /// Snapshot of the signed-in user.
    pub fn me(&self) -> Result<User> {
        Ok(lock(&self.state)?.user.clone())
    }

    /// The shared state handle, for wiring up sibling components.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    // ------------------------------------------------------------------
    // Selection & conversation
    // ------------------------------------------------------------------

    /// Select a chat and load its conversation (full scan, ascending
    /// timestamps).
    pub fn select_chat(&mut self, target: ChatTarget) -> Result<&[Message]> {
        let guard = lock(&self.state)?;
        let messages = guard.db.conversation(&guard.user.id, &target)?;
        drop(guard);

        info!(?target, count = messages.len(), "chat selected");
        self.selected = Some(target);
        self.messages = messages;
        Ok(&self.messages)
    }

    pub fn selected_chat(&self) -> Option<&ChatTarget> {
        self.selected.as_ref()
    }

    /// The loaded conversation for the selected chat.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn require_selected(&self) -> Result<ChatTarget> {
        self.selected.clone().ok_or(ClientError::NoChatSelected)
    }

    /// Write a message through to the store, mirror it into the view if its
    /// chat is selected, and emit [`ClientEvent::MessageAppended`].
    pub(crate) fn append_message(&mut self, message: Message) -> Result<()> {
        lock(&self.state)?.db.insert_message(&message)?;

        if self.selected.as_ref() == Some(&message.target) {
            self.messages.push(message.clone());
        }
        emit(&self.events, ClientEvent::MessageAppended { message });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Text messages
    // ------------------------------------------------------------------

    /// Send a text message to the selected chat.
    pub fn send_text(&mut self, content: &str) -> Result<Message> {
        let target = self.require_selected()?;
        if content.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }

        let me = self.me()?;
        let message = Message::new(
            me.id,
            me.name,
            target.clone(),
            MessageBody::Text {
                content: content.to_string(),
            },
        );

        self.append_message(message.clone())?;

        // Group sends also refresh that group's chat-list preview.
        if let ChatTarget::Group(group_id) = target {
            lock(&self.state)?.db.set_last_message(group_id, content)?;
        }

        info!(msg_id = %message.id, "message sent");
        Ok(message)
    }

    // ------------------------------------------------------------------
    // Group chats
    // ------------------------------------------------------------------

    /// Create a group chat and make it the selected chat.  The creator is
    /// prepended to the member list.
    pub fn create_group_chat(&mut self, name: &str, members: Vec<UserId>) -> Result<GroupChat> {
        if name.trim().is_empty() || members.is_empty() {
            return Err(ClientError::InvalidGroup);
        }

        let me = self.me()?;
        let group = GroupChat::new(name, me.id, members);
        lock(&self.state)?.db.create_group_chat(&group)?;

        info!(group = %group.id, name = %group.name, "group chat created");
        self.select_chat(ChatTarget::Group(group.id))?;
        Ok(group)
    }

    /// The group chats the signed-in user belongs to.
    pub fn group_chats(&self) -> Result<Vec<GroupChat>> {
        let guard = lock(&self.state)?;
        Ok(guard.db.group_chats_for_member(&guard.user.id)?)
    }

    /// Case-insensitive name filter over the user's group chats.
    pub fn filter_group_chats(&self, query: &str) -> Result<Vec<GroupChat>> {
        let needle = query.to_lowercase();
        Ok(self
            .group_chats()?
            .into_iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .collect())
    }
}
