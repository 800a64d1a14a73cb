//! Schema migrations for the collaboration store.
//!
//! The `user_version` pragma records the schema revision a database file is
//! at.  Opening a connection applies every migration above that revision,
//! in order, before any repository call touches the tables (users, messages,
//! group_chats, course_invitations, study_groups, notes, voice_clips,
//! courses).

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Schema revision a fully migrated database reports.
pub const SCHEMA_VERSION: u32 = 1;

type Migration = (u32, &'static str, fn(&Connection) -> rusqlite::Result<()>);

/// Ordered migration table.  Append a `(version, name, up)` row and bump
/// [`SCHEMA_VERSION`] whenever the schema changes.
const MIGRATIONS: [Migration; 1] = [(1, "v001_initial", v001_initial::up)];

/// Bring the connection's schema up to [`SCHEMA_VERSION`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let mut version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    for (target, name, up) in MIGRATIONS {
        if version >= target {
            continue;
        }
        tracing::info!(name, from = version, to = target, "applying schema migration");
        up(conn).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        conn.pragma_update(None, "user_version", target)?;
        version = target;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reapplying_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
