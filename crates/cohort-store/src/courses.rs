//! Storage for [`Course`] records, the source of the invitation picker.

use rusqlite::params;

use cohort_shared::{CourseId, UserId};

use crate::database::Database;
use crate::error::Result;
use crate::models::Course;

impl Database {
    /// Insert a course, or replace its title/owner.
    pub fn upsert_course(&self, course: &Course) -> Result<()> {
        self.conn().execute(
            "INSERT INTO courses (id, title, owner_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 owner_id = excluded.owner_id",
            params![course.id.to_string(), course.title, course.owner.as_str()],
        )?;
        Ok(())
    }

    /// List the courses a user owns, ordered by title.
    pub fn courses_for_user(&self, owner: &UserId) -> Result<Vec<Course>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, title, owner_id FROM courses
             WHERE owner_id = ?1
             ORDER BY title ASC",
        )?;

        let rows = stmt.query_map(params![owner.as_str()], |row| {
            Ok(Course {
                id: CourseId(row.get(0)?),
                title: row.get(1)?,
                owner: UserId(row.get(2)?),
            })
        })?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?);
        }
        Ok(courses)
    }
}
