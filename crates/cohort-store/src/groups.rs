//! CRUD operations for [`GroupChat`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use cohort_shared::constants::GROUP_PREVIEW_LEN;
use cohort_shared::{GroupId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::GroupChat;

impl Database {
    /// Insert a new group chat.
    pub fn create_group_chat(&self, group: &GroupChat) -> Result<()> {
        self.conn().execute(
            "INSERT INTO group_chats
                 (id, name, members, creator_id, created_at, last_message, unread_count, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                group.id.to_string(),
                group.name,
                serde_json::to_string(&group.members)?,
                group.creator.as_str(),
                group.created_at.to_rfc3339(),
                group.last_message,
                group.unread_count,
                group.revision,
            ],
        )?;
        Ok(())
    }

    /// Fetch a single group chat by id.
    pub fn get_group_chat(&self, id: GroupId) -> Result<GroupChat> {
        self.conn()
            .query_row(
                "SELECT id, name, members, creator_id, created_at, last_message, unread_count, revision
                 FROM group_chats WHERE id = ?1",
                params![id.to_string()],
                row_to_group,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List the group chats a user belongs to, oldest first.
    pub fn group_chats_for_member(&self, member: &UserId) -> Result<Vec<GroupChat>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, members, creator_id, created_at, last_message, unread_count, revision
             FROM group_chats ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map([], row_to_group)?;

        let mut groups = Vec::new();
        for row in rows {
            let group = row?;
            if group.members.contains(member) {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    /// Refresh a group's last-message preview, truncated to
    /// [`GROUP_PREVIEW_LEN`] characters.  Bumps the revision.
    pub fn set_last_message(&self, id: GroupId, preview: &str) -> Result<()> {
        let truncated: String = preview.chars().take(GROUP_PREVIEW_LEN).collect();
        let affected = self.conn().execute(
            "UPDATE group_chats
             SET last_message = ?2, revision = revision + 1
             WHERE id = ?1",
            params![id.to_string(), truncated],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_group(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupChat> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let members_json: String = row.get(2)?;
    let creator: String = row.get(3)?;
    let created_str: String = row.get(4)?;
    let last_message: Option<String> = row.get(5)?;
    let unread_count: u32 = row.get(6)?;
    let revision: i64 = row.get(7)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let members: Vec<UserId> = serde_json::from_str(&members_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(GroupChat {
        id: GroupId(id),
        name,
        members,
        creator: UserId(creator),
        created_at,
        last_message,
        unread_count,
        revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_filter_and_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let group = GroupChat::new(
            "Study",
            UserId::from("u1"),
            vec![UserId::from("u2"), UserId::from("u3")],
        );
        db.create_group_chat(&group).unwrap();

        assert_eq!(db.group_chats_for_member(&UserId::from("u2")).unwrap().len(), 1);
        assert!(db.group_chats_for_member(&UserId::from("u9")).unwrap().is_empty());

        let loaded = db.get_group_chat(group.id).unwrap();
        assert_eq!(loaded, group);
    }

    #[test]
    fn last_message_preview_truncates_and_bumps_revision() {
        let db = Database::open_in_memory().unwrap();
        let group = GroupChat::new("Study", UserId::from("u1"), vec![UserId::from("u2")]);
        db.create_group_chat(&group).unwrap();

        let long = "x".repeat(80);
        db.set_last_message(group.id, &long).unwrap();

        let loaded = db.get_group_chat(group.id).unwrap();
        assert_eq!(loaded.last_message.as_ref().unwrap().len(), GROUP_PREVIEW_LEN);
        assert_eq!(loaded.revision, 1);
    }

    #[test]
    fn preview_for_unknown_group_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.set_last_message(GroupId::new(), "hi").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
