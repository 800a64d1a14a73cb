//! CRUD operations for [`CourseInvitation`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use cohort_shared::{CourseId, InviteStatus, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::CourseInvitation;

impl Database {
    /// Insert a new (pending) invitation.
    pub fn insert_invitation(&self, invitation: &CourseInvitation) -> Result<()> {
        self.conn().execute(
            "INSERT INTO course_invitations
                 (id, course_id, course_name, from_user_id, from_user_name, to_user_id,
                  status, sent_at, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                invitation.id.to_string(),
                invitation.course_id.to_string(),
                invitation.course_name,
                invitation.from.as_str(),
                invitation.from_name,
                invitation.to.as_str(),
                status_str(invitation.status),
                invitation.sent_at.to_rfc3339(),
                invitation.revision,
            ],
        )?;
        Ok(())
    }

    /// Fetch a single invitation by id.
    pub fn get_invitation(&self, id: Uuid) -> Result<CourseInvitation> {
        self.conn()
            .query_row(
                "SELECT id, course_id, course_name, from_user_id, from_user_name, to_user_id,
                        status, sent_at, revision
                 FROM course_invitations WHERE id = ?1",
                params![id.to_string()],
                row_to_invitation,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List invitations a user sent or received, newest first.
    pub fn invitations_for_user(&self, user: &UserId) -> Result<Vec<CourseInvitation>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, course_id, course_name, from_user_id, from_user_name, to_user_id,
                    status, sent_at, revision
             FROM course_invitations
             WHERE to_user_id = ?1 OR from_user_id = ?1
             ORDER BY sent_at DESC",
        )?;

        let rows = stmt.query_map(params![user.as_str()], row_to_invitation)?;

        let mut invitations = Vec::new();
        for row in rows {
            invitations.push(row?);
        }
        Ok(invitations)
    }

    /// Transition an invitation to the given status.
    ///
    /// Idempotent: re-applying the current status leaves the row (and its
    /// revision) untouched.  Returns the stored invitation.
    pub fn set_invitation_status(
        &self,
        id: Uuid,
        status: InviteStatus,
    ) -> Result<CourseInvitation> {
        let affected = self.conn().execute(
            "UPDATE course_invitations
             SET status = ?2, revision = revision + 1
             WHERE id = ?1 AND status <> ?2",
            params![id.to_string(), status_str(status)],
        )?;
        if affected > 0 {
            tracing::info!(invitation = %id, status = status_str(status), "invitation updated");
        }
        self.get_invitation(id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn status_str(status: InviteStatus) -> &'static str {
    match status {
        InviteStatus::Pending => "pending",
        InviteStatus::Accepted => "accepted",
        InviteStatus::Declined => "declined",
    }
}

fn row_to_invitation(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourseInvitation> {
    let id_str: String = row.get(0)?;
    let course_id: String = row.get(1)?;
    let course_name: String = row.get(2)?;
    let from: String = row.get(3)?;
    let from_name: String = row.get(4)?;
    let to: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let sent_str: String = row.get(7)?;
    let revision: i64 = row.get(8)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let status = match status_str.as_str() {
        "pending" => InviteStatus::Pending,
        "accepted" => InviteStatus::Accepted,
        "declined" => InviteStatus::Declined,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                format!("unknown invitation status: {other}").into(),
            ))
        }
    };

    let sent_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&sent_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CourseInvitation {
        id,
        course_id: CourseId(course_id),
        course_name,
        from: UserId(from),
        from_name,
        to: UserId(to),
        status,
        sent_at,
        revision,
    })
}
