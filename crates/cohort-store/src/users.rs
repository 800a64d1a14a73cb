//! CRUD operations for [`User`] records and the local-user slot.

use chrono::{DateTime, Utc};
use rusqlite::params;

use cohort_shared::UserId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    // ------------------------------------------------------------------
    // Create / update
    // ------------------------------------------------------------------

    /// Insert a user, or replace the stored record wholesale.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, name, email, friends, created_at, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 friends = excluded.friends,
                 revision = excluded.revision",
            params![
                user.id.as_str(),
                user.name,
                user.email,
                serde_json::to_string(&user.friends)?,
                user.created_at.to_rfc3339(),
                user.revision,
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single user by id.
    pub fn get_user(&self, id: &UserId) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name, email, friends, created_at, revision
                 FROM users WHERE id = ?1",
                params![id.as_str()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List every known user, ordered by name.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, email, friends, created_at, revision
             FROM users ORDER BY name ASC",
        )?;

        let rows = stmt.query_map([], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    // ------------------------------------------------------------------
    // Friendship
    // ------------------------------------------------------------------

    /// Make `a` and `b` friends of each other.
    ///
    /// Symmetric and idempotent: either direction is added only if missing,
    /// and calling this twice leaves each user in the other's friend list
    /// exactly once.  Returns `true` if anything changed.
    pub fn add_friend(&self, a: &UserId, b: &UserId) -> Result<bool> {
        let mut user_a = self.get_user(a)?;
        let mut user_b = self.get_user(b)?;
        let mut changed = false;

        if !user_a.is_friend_of(b) {
            user_a.friends.push(b.clone());
            user_a.revision += 1;
            self.upsert_user(&user_a)?;
            changed = true;
        }
        if !user_b.is_friend_of(a) {
            user_b.friends.push(a.clone());
            user_b.revision += 1;
            self.upsert_user(&user_b)?;
            changed = true;
        }

        if changed {
            tracing::info!(user = %a, friend = %b, "friendship added");
        }
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // Local user slot
    // ------------------------------------------------------------------

    /// Point the local-user slot at the given user id.
    pub fn set_local_user(&self, id: &UserId) -> Result<()> {
        self.conn().execute(
            "INSERT INTO local_user (slot, user_id) VALUES (0, ?1)
             ON CONFLICT(slot) DO UPDATE SET user_id = excluded.user_id",
            params![id.as_str()],
        )?;
        Ok(())
    }

    /// Resolve the local user.  `NotFound` when no one is signed in.
    pub fn local_user(&self) -> Result<User> {
        let id: String = self
            .conn()
            .query_row("SELECT user_id FROM local_user WHERE slot = 0", [], |row| {
                row.get(0)
            })
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;
        self.get_user(&UserId(id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let friends_json: String = row.get(3)?;
    let created_str: String = row.get(4)?;
    let revision: i64 = row.get(5)?;

    let friends: Vec<UserId> = serde_json::from_str(&friends_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id: UserId(id),
        name,
        email,
        friends,
        created_at,
        revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(db: &Database) {
        db.upsert_user(&User::new("u1", "Alice", "alice@example.com"))
            .unwrap();
        db.upsert_user(&User::new("u2", "Bob", "bob@example.com"))
            .unwrap();
    }

    #[test]
    fn add_friend_is_symmetric_and_idempotent() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let a = UserId::from("u1");
        let b = UserId::from("u2");

        assert!(db.add_friend(&a, &b).unwrap());
        // Second call is a no-op.
        assert!(!db.add_friend(&a, &b).unwrap());

        let user_a = db.get_user(&a).unwrap();
        let user_b = db.get_user(&b).unwrap();
        assert_eq!(user_a.friends, vec![b.clone()]);
        assert_eq!(user_b.friends, vec![a.clone()]);
        assert_eq!(user_a.revision, 1);
    }

    #[test]
    fn add_friend_requires_both_users() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let err = db
            .add_friend(&UserId::from("u1"), &UserId::from("missing"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn local_user_slot() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        assert!(matches!(db.local_user(), Err(StoreError::NotFound)));

        db.set_local_user(&UserId::from("u1")).unwrap();
        assert_eq!(db.local_user().unwrap().name, "Alice");

        db.set_local_user(&UserId::from("u2")).unwrap();
        assert_eq!(db.local_user().unwrap().name, "Bob");
    }
}
