use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::snapshot::{QuizSnapshotDoc, QuizVersion, QuizVersionSummary};

use super::import_record::{format_ts, parse_ts, parse_uuid};

pub fn insert_version(conn: &Connection, version: &QuizVersion) -> Result<(), DatabaseError> {
    let snapshot_json =
        serde_json::to_string(&version.snapshot).map_err(|e| DatabaseError::MalformedPayload {
            column: "snapshot".into(),
            reason: e.to_string(),
        })?;
    conn.execute(
        "INSERT INTO quiz_versions (id, quiz_id, version_number, snapshot, created_by, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            version.id.to_string(),
            version.quiz_id.to_string(),
            version.version_number,
            snapshot_json,
            version.created_by.to_string(),
            version.reason,
            format_ts(&version.created_at),
        ],
    )?;
    Ok(())
}

/// Highest version number recorded for a quiz (0 when none exist).
pub fn max_version_number(conn: &Connection, quiz_id: &Uuid) -> Result<i64, DatabaseError> {
    let max = conn.query_row(
        "SELECT COALESCE(MAX(version_number), 0) FROM quiz_versions WHERE quiz_id = ?1",
        params![quiz_id.to_string()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(max)
}

/// Version summaries for a quiz, newest first. Snapshot bodies stay on disk.
pub fn list_versions(
    conn: &Connection,
    quiz_id: &Uuid,
) -> Result<Vec<QuizVersionSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT version_number, created_at, created_by, reason
         FROM quiz_versions WHERE quiz_id = ?1 ORDER BY version_number DESC",
    )?;
    let rows = stmt.query_map(params![quiz_id.to_string()], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (version_number, created_at, created_by, reason) = row?;
        summaries.push(QuizVersionSummary {
            version_number,
            created_at: parse_ts(&created_at),
            created_by: parse_uuid(&created_by)?,
            reason,
        });
    }
    Ok(summaries)
}

/// Load a full snapshot body by quiz and version number.
pub fn get_version(
    conn: &Connection,
    quiz_id: &Uuid,
    version_number: i64,
) -> Result<Option<QuizVersion>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, quiz_id, version_number, snapshot, created_by, reason, created_at
         FROM quiz_versions WHERE quiz_id = ?1 AND version_number = ?2",
    )?;
    let result = stmt.query_row(params![quiz_id.to_string(), version_number], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    });

    let (id, quiz_id_str, number, snapshot, created_by, reason, created_at) = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let snapshot: QuizSnapshotDoc =
        serde_json::from_str(&snapshot).map_err(|e| DatabaseError::MalformedPayload {
            column: "snapshot".into(),
            reason: e.to_string(),
        })?;

    Ok(Some(QuizVersion {
        id: parse_uuid(&id)?,
        quiz_id: parse_uuid(&quiz_id_str)?,
        version_number: number,
        snapshot,
        created_by: parse_uuid(&created_by)?,
        reason,
        created_at: parse_ts(&created_at),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::quiz::insert_quiz;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::WorkflowStatus;
    use crate::models::quiz::Quiz;

    fn setup_quiz(conn: &Connection) -> Quiz {
        let now = chrono::Local::now().naive_local();
        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: "Versioned".into(),
            description: None,
            owner_id: Uuid::new_v4(),
            workflow_status: WorkflowStatus::Draft,
            submitted_at: None,
            submitted_by: None,
            reviewed_at: None,
            reviewed_by: None,
            review_message: None,
            published_at: None,
            published_by: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        };
        insert_quiz(conn, &quiz).unwrap();
        quiz
    }

    fn make_version(quiz: &Quiz, number: i64) -> QuizVersion {
        QuizVersion {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            version_number: number,
            snapshot: QuizSnapshotDoc {
                quiz: quiz.clone(),
                questions: vec![],
            },
            created_by: quiz.owner_id,
            reason: "test".into(),
            created_at: chrono::Local::now().naive_local(),
        }
    }

    #[test]
    fn max_version_zero_when_empty() {
        let conn = open_memory_database().unwrap();
        let quiz = setup_quiz(&conn);
        assert_eq!(max_version_number(&conn, &quiz.id).unwrap(), 0);
    }

    #[test]
    fn versions_list_newest_first() {
        let conn = open_memory_database().unwrap();
        let quiz = setup_quiz(&conn);
        for n in 1..=3 {
            insert_version(&conn, &make_version(&quiz, n)).unwrap();
        }

        assert_eq!(max_version_number(&conn, &quiz.id).unwrap(), 3);
        let listed = list_versions(&conn, &quiz.id).unwrap();
        let numbers: Vec<i64> = listed.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn snapshot_body_round_trips() {
        let conn = open_memory_database().unwrap();
        let quiz = setup_quiz(&conn);
        insert_version(&conn, &make_version(&quiz, 1)).unwrap();

        let loaded = get_version(&conn, &quiz.id, 1).unwrap().unwrap();
        assert_eq!(loaded.snapshot.quiz.title, "Versioned");
        assert!(loaded.snapshot.questions.is_empty());
        assert!(get_version(&conn, &quiz.id, 9).unwrap().is_none());
    }
}
