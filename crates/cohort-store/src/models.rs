//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to an embedding UI layer.  Mutable records carry a `revision`
//! counter that the repository bumps on every update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cohort_shared::{AudioFormat, CallStatus, ChatTarget, CourseId, GroupId, InviteStatus, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A platform user as mirrored from the auth provider, plus the friend list
/// this module maintains.  Friendship is symmetric: `a.friends` contains `b`
/// exactly when `b.friends` contains `a`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Opaque id assigned by the auth provider.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, also searched by the directory filter.
    pub email: String,
    /// Ids of this user's friends.
    pub friends: Vec<UserId>,
    /// When this user was first seen locally.
    pub created_at: DateTime<Utc>,
    /// Bumped on every update.
    pub revision: i64,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            friends: Vec::new(),
            created_at: Utc::now(),
            revision: 0,
        }
    }

    pub fn is_friend_of(&self, id: &UserId) -> bool {
        self.friends.contains(id)
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.  Immutable once created; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Who sent it.
    pub sender: UserId,
    /// Sender display name captured at send time.
    pub sender_name: String,
    /// Exactly one peer or one group, by construction.
    pub target: ChatTarget,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
    /// Kind-specific payload.
    pub body: MessageBody,
}

impl Message {
    pub fn new(
        sender: UserId,
        sender_name: impl Into<String>,
        target: ChatTarget,
        body: MessageBody,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            sender_name: sender_name.into(),
            target,
            sent_at: Utc::now(),
            body,
        }
    }

    /// Short human-readable text used for chat-list previews.
    pub fn preview(&self) -> String {
        match &self.body {
            MessageBody::Text { content } => content.clone(),
            MessageBody::CourseInvite { course_name, .. } => {
                format!("Course invitation: {course_name}")
            }
            MessageBody::StudyGroup { name, .. } => format!("Study group: {name}"),
            MessageBody::Voice { duration_secs, .. } => {
                format!("Voice message ({})", format_duration(*duration_secs))
            }
            MessageBody::VideoCall { phase } => match phase {
                CallPhase::Started => "Video call started".to_string(),
                CallPhase::Ended { duration_secs, .. } => {
                    format!("Call ended ({})", format_duration(*duration_secs))
                }
            },
        }
    }
}

/// Kind-specific message payload, tagged so each message kind carries
/// exactly the fields it needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Text {
        content: String,
    },
    CourseInvite {
        course_id: CourseId,
        course_name: String,
        invitation_id: Uuid,
    },
    StudyGroup {
        group_id: GroupId,
        name: String,
    },
    Voice {
        clip_id: Uuid,
        duration_secs: u32,
    },
    VideoCall {
        phase: CallPhase,
    },
}

/// Which end of a call a video-call message records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CallPhase {
    Started,
    Ended {
        duration_secs: u32,
        status: CallStatus,
    },
}

/// Render whole seconds as `m:ss`.
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

// ---------------------------------------------------------------------------
// GroupChat
// ---------------------------------------------------------------------------

/// A multi-party conversation.  `members` always includes the creator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupChat {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<UserId>,
    pub creator: UserId,
    pub created_at: DateTime<Utc>,
    /// Truncated preview of the most recent message, if any.
    pub last_message: Option<String>,
    pub unread_count: u32,
    pub revision: i64,
}

impl GroupChat {
    /// Build a new group chat.  The creator is prepended to the member list
    /// and appears exactly once.
    pub fn new(name: impl Into<String>, creator: UserId, members: Vec<UserId>) -> Self {
        let mut all = Vec::with_capacity(members.len() + 1);
        all.push(creator.clone());
        for m in members {
            if !all.contains(&m) {
                all.push(m);
            }
        }
        Self {
            id: GroupId::new(),
            name: name.into(),
            members: all,
            creator,
            created_at: Utc::now(),
            last_message: None,
            unread_count: 0,
            revision: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// CourseInvitation
// ---------------------------------------------------------------------------

/// An invitation to study a course together.  Created pending; accept and
/// decline are both explicit transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseInvitation {
    pub id: Uuid,
    pub course_id: CourseId,
    pub course_name: String,
    pub from: UserId,
    pub from_name: String,
    pub to: UserId,
    pub status: InviteStatus,
    pub sent_at: DateTime<Utc>,
    pub revision: i64,
}

impl CourseInvitation {
    pub fn new(
        course_id: CourseId,
        course_name: impl Into<String>,
        from: UserId,
        from_name: impl Into<String>,
        to: UserId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id,
            course_name: course_name.into(),
            from,
            from_name: from_name.into(),
            to,
            status: InviteStatus::Pending,
            sent_at: Utc::now(),
            revision: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// StudyGroup
// ---------------------------------------------------------------------------

/// A study group attached to a course.  Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyGroup {
    pub id: GroupId,
    pub name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub members: Vec<UserId>,
    pub creator: UserId,
    pub created_at: DateTime<Utc>,
}

impl StudyGroup {
    /// Build a study group named after its course.  The creator is prepended
    /// to the member list and appears exactly once.
    pub fn new(course_id: CourseId, course_name: &str, creator: UserId, members: Vec<UserId>) -> Self {
        let mut all = Vec::with_capacity(members.len() + 1);
        all.push(creator.clone());
        for m in members {
            if !all.contains(&m) {
                all.push(m);
            }
        }
        Self {
            id: GroupId::new(),
            name: format!("{course_name} Study Group"),
            course_id,
            course_name: course_name.to_string(),
            members: all,
            creator,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

/// A personal note.  Full CRUD lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: i64,
}

impl Note {
    pub fn new(owner: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            owner,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceClip
// ---------------------------------------------------------------------------

/// Metadata for a recorded voice clip referenced by voice messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceClip {
    pub id: Uuid,
    /// Playable resource handle understood by the audio sink.
    pub uri: String,
    pub duration_secs: u32,
    pub format: AudioFormat,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// A course owned by a user; drives the invitation picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub owner: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_chat_prepends_creator_once() {
        let creator = UserId::from("u1");
        let group = GroupChat::new(
            "Study",
            creator.clone(),
            vec![UserId::from("u2"), creator.clone(), UserId::from("u3")],
        );
        assert_eq!(
            group.members,
            vec![UserId::from("u1"), UserId::from("u2"), UserId::from("u3")]
        );
    }

    #[test]
    fn study_group_named_after_course() {
        let group = StudyGroup::new(
            CourseId::new("c1"),
            "Algebra",
            UserId::from("u1"),
            vec![UserId::from("u2")],
        );
        assert_eq!(group.name, "Algebra Study Group");
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn message_preview_formats_durations() {
        let msg = Message::new(
            UserId::from("u1"),
            "Alice",
            ChatTarget::Direct(UserId::from("u2")),
            MessageBody::Voice {
                clip_id: Uuid::new_v4(),
                duration_secs: 75,
            },
        );
        assert_eq!(msg.preview(), "Voice message (1:15)");
    }
}
