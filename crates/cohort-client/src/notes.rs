//! The notes component: a personal notebook with full CRUD and a simple
//! text search, scoped to the signed-in user.

use tracing::info;
use uuid::Uuid;

use cohort_store::Note;

use crate::error::{ClientError, Result};
use crate::state::{lock, SharedState};

/// The notes component.  Holds an in-memory view over the owner's notes,
/// newest edits first.
pub struct Notes {
    state: SharedState,
    notes: Vec<Note>,
}

impl Notes {
    pub fn new(state: SharedState) -> Result<Self> {
        let mut this = Self {
            state,
            notes: Vec::new(),
        };
        this.reload()?;
        Ok(this)
    }

    /// Re-read the owner's notes from the store.
    pub fn reload(&mut self) -> Result<()> {
        let guard = lock(&self.state)?;
        self.notes = guard.db.notes_for_user(&guard.user.id)?;
        Ok(())
    }

    /// Notes ordered by most recent update.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Create a note.  Title and content must both be non-blank; the text
    /// is stored as entered.
    pub fn create(&mut self, title: &str, content: &str) -> Result<Note> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(ClientError::EmptyNote);
        }

        let guard = lock(&self.state)?;
        let note = Note::new(guard.user.id.clone(), title, content);
        guard.db.insert_note(&note)?;
        drop(guard);

        info!(note = %note.id, "note created");
        self.reload()?;
        Ok(note)
    }

    /// Update a note's title and content, refreshing its edit timestamp.
    pub fn update(&mut self, id: Uuid, title: &str, content: &str) -> Result<Note> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(ClientError::EmptyNote);
        }

        let note = lock(&self.state)?.db.update_note(id, title, content)?;
        info!(note = %note.id, revision = note.revision, "note updated");
        self.reload()?;
        Ok(note)
    }

    /// Delete a note.  Returns false if it did not exist.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        let deleted = lock(&self.state)?.db.delete_note(id)?;
        if deleted {
            info!(note = %id, "note deleted");
            self.reload()?;
        }
        Ok(deleted)
    }

    /// Case-insensitive search over title and content.  A blank term
    /// matches everything.
    pub fn search(&self, term: &str) -> Vec<&Note> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.notes.iter().collect();
        }
        self.notes
            .iter()
            .filter(|n| {
                n.title.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use cohort_store::{Database, StoreError, User};

    fn notes() -> Notes {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("alice", "Alice", "alice@example.edu");
        let state = AppState::with_user(db, user).unwrap().into_shared();
        Notes::new(state).unwrap()
    }

    #[test]
    fn create_rejects_blank_fields() {
        let mut n = notes();
        assert!(matches!(n.create("  ", "body"), Err(ClientError::EmptyNote)));
        assert!(matches!(n.create("title", "\n"), Err(ClientError::EmptyNote)));
        assert!(n.notes().is_empty());
    }

    #[test]
    fn crud_round_trip() {
        let mut n = notes();
        let created = n.create("Lecture 3", "Mitochondria").unwrap();
        assert_eq!(n.notes().len(), 1);

        let updated = n.update(created.id, "Lecture 3", "Mitochondria, ribosomes").unwrap();
        assert_eq!(updated.revision, created.revision + 1);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(n.notes()[0].content, "Mitochondria, ribosomes");

        assert!(n.delete(created.id).unwrap());
        assert!(!n.delete(created.id).unwrap());
        assert!(n.notes().is_empty());
    }

    #[test]
    fn update_missing_note_is_not_found() {
        let mut n = notes();
        assert!(matches!(
            n.update(Uuid::new_v4(), "t", "c"),
            Err(ClientError::Store(StoreError::NotFound))
        ));
    }

    #[test]
    fn most_recently_updated_comes_first() {
        let mut n = notes();
        let first = n.create("first", "a").unwrap();
        n.create("second", "b").unwrap();

        n.update(first.id, "first", "a edited").unwrap();
        assert_eq!(n.notes()[0].title, "first");
    }

    #[test]
    fn search_matches_title_or_content_case_insensitively() {
        let mut n = notes();
        n.create("Biology", "cells divide").unwrap();
        n.create("History", "the biology of empires").unwrap();
        n.create("Math", "integrals").unwrap();

        assert_eq!(n.search("BIOLOGY").len(), 2);
        assert_eq!(n.search("integrals").len(), 1);
        assert!(n.search("chemistry").is_empty());
        assert_eq!(n.search("   ").len(), 3);
    }
}
