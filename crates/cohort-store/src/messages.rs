//! Append and query operations for [`Message`] records.
//!
//! Messages are immutable: there is no update or delete.  Conversation
//! queries return ascending timestamp order regardless of insert order.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use cohort_shared::{ChatTarget, GroupId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Message, MessageBody};

impl Database {
    /// Append a message.  Exactly one of the receiver/group columns is set,
    /// derived from the message's [`ChatTarget`].
    pub fn insert_message(&self, message: &Message) -> Result<()> {
        let (receiver_id, group_id) = match &message.target {
            ChatTarget::Direct(peer) => (Some(peer.as_str().to_string()), None),
            ChatTarget::Group(group) => (None, Some(group.to_string())),
        };

        self.conn().execute(
            "INSERT INTO messages (id, sender_id, sender_name, receiver_id, group_id, sent_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                message.id.to_string(),
                message.sender.as_str(),
                message.sender_name,
                receiver_id,
                group_id,
                message.sent_at.to_rfc3339(),
                serde_json::to_string(&message.body)?,
            ],
        )?;
        Ok(())
    }

    /// Load the conversation between the local user and the selected chat.
    ///
    /// For a group this is every message addressed to the group; for a
    /// direct chat it is every message exchanged between the pair, in either
    /// direction.  Always ascending by timestamp.
    pub fn conversation(&self, me: &UserId, target: &ChatTarget) -> Result<Vec<Message>> {
        let mut messages = Vec::new();

        match target {
            ChatTarget::Group(group) => {
                let mut stmt = self.conn().prepare(
                    "SELECT id, sender_id, sender_name, receiver_id, group_id, sent_at, body
                     FROM messages
                     WHERE group_id = ?1
                     ORDER BY sent_at ASC",
                )?;
                let rows = stmt.query_map(params![group.to_string()], row_to_message)?;
                for row in rows {
                    messages.push(row?);
                }
            }
            ChatTarget::Direct(peer) => {
                let mut stmt = self.conn().prepare(
                    "SELECT id, sender_id, sender_name, receiver_id, group_id, sent_at, body
                     FROM messages
                     WHERE (sender_id = ?1 AND receiver_id = ?2)
                        OR (sender_id = ?2 AND receiver_id = ?1)
                     ORDER BY sent_at ASC",
                )?;
                let rows = stmt.query_map(params![me.as_str(), peer.as_str()], row_to_message)?;
                for row in rows {
                    messages.push(row?);
                }
            }
        }

        Ok(messages)
    }

    /// Fetch a single message by id.
    pub fn get_message(&self, id: Uuid) -> Result<Message> {
        self.conn()
            .query_row(
                "SELECT id, sender_id, sender_name, receiver_id, group_id, sent_at, body
                 FROM messages WHERE id = ?1",
                params![id.to_string()],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let sender: String = row.get(1)?;
    let sender_name: String = row.get(2)?;
    let receiver_id: Option<String> = row.get(3)?;
    let group_id: Option<String> = row.get(4)?;
    let sent_str: String = row.get(5)?;
    let body_json: String = row.get(6)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let target = match (receiver_id, group_id) {
        (Some(peer), None) => ChatTarget::Direct(UserId(peer)),
        (None, Some(group)) => {
            let uuid = Uuid::parse_str(&group).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            ChatTarget::Group(GroupId(uuid))
        }
        // Unreachable: the schema CHECK enforces exactly one.
        _ => return Err(rusqlite::Error::InvalidQuery),
    };

    let sent_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&sent_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let body: MessageBody = serde_json::from_str(&body_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Message {
        id,
        sender: UserId(sender),
        sender_name,
        target,
        sent_at,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn text(sender: &str, target: ChatTarget, content: &str) -> Message {
        Message::new(
            UserId::from(sender),
            sender.to_string(),
            target,
            MessageBody::Text {
                content: content.to_string(),
            },
        )
    }

    #[test]
    fn direct_conversation_matches_pair_both_ways() {
        let db = Database::open_in_memory().unwrap();
        let a = UserId::from("u1");
        let b = UserId::from("u2");
        let c = UserId::from("u3");

        db.insert_message(&text("u1", ChatTarget::Direct(b.clone()), "hi"))
            .unwrap();
        db.insert_message(&text("u2", ChatTarget::Direct(a.clone()), "hey"))
            .unwrap();
        db.insert_message(&text("u1", ChatTarget::Direct(c.clone()), "other chat"))
            .unwrap();

        let from_a = db.conversation(&a, &ChatTarget::Direct(b.clone())).unwrap();
        let from_b = db.conversation(&b, &ChatTarget::Direct(a.clone())).unwrap();
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn conversation_sorts_ascending_regardless_of_insert_order() {
        let db = Database::open_in_memory().unwrap();
        let a = UserId::from("u1");
        let b = UserId::from("u2");

        let mut late = text("u1", ChatTarget::Direct(b.clone()), "second");
        late.sent_at = Utc::now();
        let mut early = text("u1", ChatTarget::Direct(b.clone()), "first");
        early.sent_at = late.sent_at - Duration::seconds(30);

        // Insert newest first.
        db.insert_message(&late).unwrap();
        db.insert_message(&early).unwrap();

        let conv = db.conversation(&a, &ChatTarget::Direct(b)).unwrap();
        assert_eq!(
            conv.iter().map(Message::preview).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
    }

    #[test]
    fn group_conversation_filters_by_group() {
        let db = Database::open_in_memory().unwrap();
        let group = GroupId::new();
        let other = GroupId::new();
        let a = UserId::from("u1");

        db.insert_message(&text("u1", ChatTarget::Group(group), "in group"))
            .unwrap();
        db.insert_message(&text("u1", ChatTarget::Group(other), "elsewhere"))
            .unwrap();
        db.insert_message(&text("u1", ChatTarget::Direct(UserId::from("u2")), "direct"))
            .unwrap();

        let conv = db.conversation(&a, &ChatTarget::Group(group)).unwrap();
        assert_eq!(conv.len(), 1);
        assert_eq!(conv[0].preview(), "in group");
    }

    #[test]
    fn body_round_trips_through_json_column() {
        let db = Database::open_in_memory().unwrap();
        let msg = Message::new(
            UserId::from("u1"),
            "Alice",
            ChatTarget::Direct(UserId::from("u2")),
            MessageBody::Voice {
                clip_id: Uuid::new_v4(),
                duration_secs: 7,
            },
        );
        db.insert_message(&msg).unwrap();

        let loaded = db.get_message(msg.id).unwrap();
        assert_eq!(loaded.body, msg.body);
        assert_eq!(loaded.target, msg.target);
    }
}
