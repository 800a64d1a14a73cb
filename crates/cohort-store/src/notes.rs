//! CRUD operations for [`Note`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use cohort_shared::UserId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Note;

impl Database {
    /// Insert a new note.
    pub fn insert_note(&self, note: &Note) -> Result<()> {
        self.conn().execute(
            "INSERT INTO notes (id, title, content, owner_id, created_at, updated_at, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                note.id.to_string(),
                note.title,
                note.content,
                note.owner.as_str(),
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
                note.revision,
            ],
        )?;
        Ok(())
    }

    /// Fetch a single note by id.
    pub fn get_note(&self, id: Uuid) -> Result<Note> {
        self.conn()
            .query_row(
                "SELECT id, title, content, owner_id, created_at, updated_at, revision
                 FROM notes WHERE id = ?1",
                params![id.to_string()],
                row_to_note,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Replace a note's title and content, refreshing `updated_at` and
    /// bumping the revision.  Returns the stored note.
    pub fn update_note(&self, id: Uuid, title: &str, content: &str) -> Result<Note> {
        let affected = self.conn().execute(
            "UPDATE notes
             SET title = ?2, content = ?3, updated_at = ?4, revision = revision + 1
             WHERE id = ?1",
            params![id.to_string(), title, content, Utc::now().to_rfc3339()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_note(id)
    }

    /// Delete a note by id.  Returns `true` if a row was deleted.
    pub fn delete_note(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM notes WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    /// List a user's notes, most recently updated first.
    pub fn notes_for_user(&self, owner: &UserId) -> Result<Vec<Note>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, title, content, owner_id, created_at, updated_at, revision
             FROM notes
             WHERE owner_id = ?1
             ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![owner.as_str()], row_to_note)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let id_str: String = row.get(0)?;
    let title: String = row.get(1)?;
    let content: String = row.get(2)?;
    let owner: String = row.get(3)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;
    let revision: i64 = row.get(6)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let parse_ts = |s: &str, col: usize| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    col,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
    };

    Ok(Note {
        id,
        title,
        content,
        owner: UserId(owner),
        created_at: parse_ts(&created_str, 4)?,
        updated_at: parse_ts(&updated_str, 5)?,
        revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crud_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let owner = UserId::from("u1");
        let note = Note::new(owner.clone(), "Limits", "lim x->0 ...");
        db.insert_note(&note).unwrap();

        let updated = db.update_note(note.id, "Limits", "lim x->inf ...").unwrap();
        assert_eq!(updated.content, "lim x->inf ...");
        assert_eq!(updated.revision, 1);
        assert!(updated.updated_at >= note.updated_at);

        assert!(db.delete_note(note.id).unwrap());
        assert!(!db.delete_note(note.id).unwrap());
        assert!(db.notes_for_user(&owner).unwrap().is_empty());
    }

    #[test]
    fn listing_is_scoped_to_owner() {
        let db = Database::open_in_memory().unwrap();
        db.insert_note(&Note::new(UserId::from("u1"), "mine", "a"))
            .unwrap();
        db.insert_note(&Note::new(UserId::from("u2"), "theirs", "b"))
            .unwrap();

        let mine = db.notes_for_user(&UserId::from("u1")).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[test]
    fn update_of_missing_note_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.update_note(Uuid::new_v4(), "t", "c").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
