use serde::{Deserialize, Serialize};
use uuid::Uuid;

// User ids come from the auth provider and are opaque strings ("u1", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier for a group chat or study group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GroupId(pub Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Course ids are owned by the course catalogue, opaque here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CourseId(pub String);

impl CourseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a message is addressed.  A message goes to exactly one peer or
/// exactly one group; there is no way to construct one with both or neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChatTarget {
    Direct(UserId),
    Group(GroupId),
}

impl ChatTarget {
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }

    pub fn peer(&self) -> Option<&UserId> {
        match self {
            Self::Direct(id) => Some(id),
            Self::Group(_) => None,
        }
    }

    pub fn group(&self) -> Option<GroupId> {
        match self {
            Self::Direct(_) => None,
            Self::Group(id) => Some(*id),
        }
    }
}

/// Friend presence as reported to the roster.
///
/// There is no presence protocol; without a heartbeat source every friend
/// is `Unknown`.  The other variants exist for a future source to fill in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Presence {
    Online,
    Offline {
        last_seen: chrono::DateTime<chrono::Utc>,
    },
    #[default]
    Unknown,
}

/// Lifecycle of a course invitation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

/// Outcome attached to a finished call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Missed,
    Completed,
    Declined,
}

/// Container formats a voice clip can be captured in, in no particular
/// order; see [`constants::AUDIO_FORMAT_PREFERENCE`] for the negotiation
/// order.
///
/// [`constants::AUDIO_FORMAT_PREFERENCE`]: crate::constants::AUDIO_FORMAT_PREFERENCE
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    Webm,
    Mp4,
    Wav,
}

impl AudioFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
            Self::Wav => "audio/wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}
