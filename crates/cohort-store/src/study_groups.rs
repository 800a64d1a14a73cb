//! CRUD operations for [`StudyGroup`] records.  Study groups are created
//! and listed, never mutated.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use cohort_shared::{CourseId, GroupId, UserId};

use crate::database::Database;
use crate::error::Result;
use crate::models::StudyGroup;

impl Database {
    /// Insert a new study group.
    pub fn insert_study_group(&self, group: &StudyGroup) -> Result<()> {
        self.conn().execute(
            "INSERT INTO study_groups
                 (id, name, course_id, course_name, members, creator_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                group.id.to_string(),
                group.name,
                group.course_id.to_string(),
                group.course_name,
                serde_json::to_string(&group.members)?,
                group.creator.as_str(),
                group.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List the study groups a user belongs to, oldest first.
    pub fn study_groups_for_member(&self, member: &UserId) -> Result<Vec<StudyGroup>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, course_id, course_name, members, creator_id, created_at
             FROM study_groups ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map([], row_to_study_group)?;

        let mut groups = Vec::new();
        for row in rows {
            let group = row?;
            if group.members.contains(member) {
                groups.push(group);
            }
        }
        Ok(groups)
    }
}

fn row_to_study_group(row: &rusqlite::Row<'_>) -> rusqlite::Result<StudyGroup> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let course_id: String = row.get(2)?;
    let course_name: String = row.get(3)?;
    let members_json: String = row.get(4)?;
    let creator: String = row.get(5)?;
    let created_str: String = row.get(6)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let members: Vec<UserId> = serde_json::from_str(&members_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(StudyGroup {
        id: GroupId(id),
        name,
        course_id: CourseId(course_id),
        course_name,
        members,
        creator: UserId(creator),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_list_by_member() {
        let db = Database::open_in_memory().unwrap();
        let group = StudyGroup::new(
            CourseId::new("c1"),
            "Algebra",
            UserId::from("u1"),
            vec![UserId::from("u2")],
        );
        db.insert_study_group(&group).unwrap();

        let for_creator = db.study_groups_for_member(&UserId::from("u1")).unwrap();
        assert_eq!(for_creator, vec![group]);
        assert!(db.study_groups_for_member(&UserId::from("u3")).unwrap().is_empty());
    }
}
