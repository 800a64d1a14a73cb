//! v001 -- Initial schema creation.
//!
//! Creates the core tables: `users`, `local_user`, `messages`,
//! `group_chats`, `course_invitations`, `study_groups`, `notes`,
//! `voice_clips`, and `courses`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users (the "all-users" directory)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY NOT NULL,   -- opaque id from the auth provider
    name       TEXT NOT NULL,
    email      TEXT NOT NULL,
    friends    TEXT NOT NULL DEFAULT '[]',  -- JSON array of user ids
    created_at TEXT NOT NULL,               -- ISO-8601 / RFC-3339
    revision   INTEGER NOT NULL DEFAULT 0
);

-- ----------------------------------------------------------------
-- Local user slot (single row pointing into users)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS local_user (
    slot    INTEGER PRIMARY KEY CHECK (slot = 0),
    user_id TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

-- ----------------------------------------------------------------
-- Messages (immutable once written)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    sender_id   TEXT NOT NULL,
    sender_name TEXT NOT NULL,
    receiver_id TEXT,                       -- direct messages
    group_id    TEXT,                       -- group messages
    sent_at     TEXT NOT NULL,              -- ISO-8601
    body        TEXT NOT NULL,              -- JSON-tagged MessageBody

    CHECK ((receiver_id IS NULL) <> (group_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_messages_group_ts
    ON messages(group_id, sent_at);
CREATE INDEX IF NOT EXISTS idx_messages_direct_ts
    ON messages(sender_id, receiver_id, sent_at);

-- ----------------------------------------------------------------
-- Group chats
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS group_chats (
    id           TEXT PRIMARY KEY NOT NULL, -- UUID v4
    name         TEXT NOT NULL,
    members      TEXT NOT NULL,             -- JSON array of user ids
    creator_id   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    last_message TEXT,                      -- truncated preview
    unread_count INTEGER NOT NULL DEFAULT 0,
    revision     INTEGER NOT NULL DEFAULT 0
);

-- ----------------------------------------------------------------
-- Course invitations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS course_invitations (
    id             TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    course_id      TEXT NOT NULL,
    course_name    TEXT NOT NULL,
    from_user_id   TEXT NOT NULL,
    from_user_name TEXT NOT NULL,
    to_user_id     TEXT NOT NULL,
    status         TEXT NOT NULL,              -- pending | accepted | declined
    sent_at        TEXT NOT NULL,
    revision       INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_invitations_to ON course_invitations(to_user_id);

-- ----------------------------------------------------------------
-- Study groups
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS study_groups (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    name        TEXT NOT NULL,
    course_id   TEXT NOT NULL,
    course_name TEXT NOT NULL,
    members     TEXT NOT NULL,              -- JSON array of user ids
    creator_id  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Notes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notes (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    owner_id   TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    revision   INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner_id);

-- ----------------------------------------------------------------
-- Voice clips
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS voice_clips (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    uri           TEXT NOT NULL,              -- playable resource handle
    duration_secs INTEGER NOT NULL,
    format        TEXT NOT NULL,              -- webm | mp4 | wav
    recorded_at   TEXT NOT NULL,
    data          BLOB NOT NULL               -- encoded audio
);

-- ----------------------------------------------------------------
-- Courses (invite picker source)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS courses (
    id       TEXT PRIMARY KEY NOT NULL,
    title    TEXT NOT NULL,
    owner_id TEXT NOT NULL
);
"#;

/// Apply the v001 schema.
pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
