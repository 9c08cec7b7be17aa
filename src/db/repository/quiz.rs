use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::WorkflowStatus;
use crate::models::quiz::Quiz;

use super::import_record::{format_ts, parse_ts, parse_uuid};

const QUIZ_COLUMNS: &str = "id, title, description, owner_id, workflow_status,
     submitted_at, submitted_by, reviewed_at, reviewed_by, review_message,
     published_at, published_by, due_date, created_at, updated_at";

pub fn insert_quiz(conn: &Connection, quiz: &Quiz) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO quizzes (id, title, description, owner_id, workflow_status,
         submitted_at, submitted_by, reviewed_at, reviewed_by, review_message,
         published_at, published_by, due_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            quiz.id.to_string(),
            quiz.title,
            quiz.description,
            quiz.owner_id.to_string(),
            quiz.workflow_status.as_str(),
            quiz.submitted_at.as_ref().map(format_ts),
            quiz.submitted_by.map(|id| id.to_string()),
            quiz.reviewed_at.as_ref().map(format_ts),
            quiz.reviewed_by.map(|id| id.to_string()),
            quiz.review_message,
            quiz.published_at.as_ref().map(format_ts),
            quiz.published_by.map(|id| id.to_string()),
            quiz.due_date.map(|d| d.to_string()),
            format_ts(&quiz.created_at),
            format_ts(&quiz.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_quiz(conn: &Connection, id: &Uuid) -> Result<Option<Quiz>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1"))?;
    let result = stmt.query_row(params![id.to_string()], map_quiz_row);
    match result {
        Ok(row) => Ok(Some(quiz_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Persist every mutable field of a quiz. Workflow transitions stamp
/// actor/timestamp fields and then call this once, all-or-nothing.
pub fn update_quiz(conn: &Connection, quiz: &Quiz) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE quizzes SET title = ?2, description = ?3, workflow_status = ?4,
         submitted_at = ?5, submitted_by = ?6, reviewed_at = ?7, reviewed_by = ?8,
         review_message = ?9, published_at = ?10, published_by = ?11, due_date = ?12,
         updated_at = datetime('now')
         WHERE id = ?1",
        params![
            quiz.id.to_string(),
            quiz.title,
            quiz.description,
            quiz.workflow_status.as_str(),
            quiz.submitted_at.as_ref().map(format_ts),
            quiz.submitted_by.map(|id| id.to_string()),
            quiz.reviewed_at.as_ref().map(format_ts),
            quiz.reviewed_by.map(|id| id.to_string()),
            quiz.review_message,
            quiz.published_at.as_ref().map(format_ts),
            quiz.published_by.map(|id| id.to_string()),
            quiz.due_date.map(|d| d.to_string()),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Quiz".into(),
            id: quiz.id.to_string(),
        });
    }
    Ok(())
}

pub fn list_quizzes_by_status(
    conn: &Connection,
    status: &WorkflowStatus,
) -> Result<Vec<Quiz>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE workflow_status = ?1 ORDER BY updated_at DESC"
    ))?;
    let rows = stmt.query_map(params![status.as_str()], map_quiz_row)?;
    let mut quizzes = Vec::new();
    for row in rows {
        quizzes.push(quiz_from_row(row?)?);
    }
    Ok(quizzes)
}

// Internal row type for Quiz mapping
struct QuizRow {
    id: String,
    title: String,
    description: Option<String>,
    owner_id: String,
    workflow_status: String,
    submitted_at: Option<String>,
    submitted_by: Option<String>,
    reviewed_at: Option<String>,
    reviewed_by: Option<String>,
    review_message: Option<String>,
    published_at: Option<String>,
    published_by: Option<String>,
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
}

fn map_quiz_row(row: &Row<'_>) -> rusqlite::Result<QuizRow> {
    Ok(QuizRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        workflow_status: row.get(4)?,
        submitted_at: row.get(5)?,
        submitted_by: row.get(6)?,
        reviewed_at: row.get(7)?,
        reviewed_by: row.get(8)?,
        review_message: row.get(9)?,
        published_at: row.get(10)?,
        published_by: row.get(11)?,
        due_date: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn quiz_from_row(row: QuizRow) -> Result<Quiz, DatabaseError> {
    Ok(Quiz {
        id: parse_uuid(&row.id)?,
        title: row.title,
        description: row.description,
        owner_id: parse_uuid(&row.owner_id)?,
        workflow_status: WorkflowStatus::from_str(&row.workflow_status)?,
        submitted_at: row.submitted_at.as_deref().map(parse_ts),
        submitted_by: row.submitted_by.and_then(|s| Uuid::parse_str(&s).ok()),
        reviewed_at: row.reviewed_at.as_deref().map(parse_ts),
        reviewed_by: row.reviewed_by.and_then(|s| Uuid::parse_str(&s).ok()),
        review_message: row.review_message,
        published_at: row.published_at.as_deref().map(parse_ts),
        published_by: row.published_by.and_then(|s| Uuid::parse_str(&s).ok()),
        due_date: row
            .due_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    pub(crate) fn sample_quiz(owner: Uuid) -> Quiz {
        let now = chrono::Local::now().naive_local();
        Quiz {
            id: Uuid::new_v4(),
            title: "Onboarding basics".into(),
            description: Some("Week-one material".into()),
            owner_id: owner,
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
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let quiz = sample_quiz(Uuid::new_v4());
        insert_quiz(&conn, &quiz).unwrap();

        let loaded = get_quiz(&conn, &quiz.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Onboarding basics");
        assert_eq!(loaded.workflow_status, WorkflowStatus::Draft);
        assert!(loaded.submitted_at.is_none());
    }

    #[test]
    fn update_persists_workflow_stamps() {
        let conn = open_memory_database().unwrap();
        let mut quiz = sample_quiz(Uuid::new_v4());
        insert_quiz(&conn, &quiz).unwrap();

        let reviewer = Uuid::new_v4();
        quiz.workflow_status = WorkflowStatus::Submitted;
        quiz.submitted_at = Some(chrono::Local::now().naive_local());
        quiz.submitted_by = Some(reviewer);
        update_quiz(&conn, &quiz).unwrap();

        let loaded = get_quiz(&conn, &quiz.id).unwrap().unwrap();
        assert_eq!(loaded.workflow_status, WorkflowStatus::Submitted);
        assert_eq!(loaded.submitted_by, Some(reviewer));
        assert!(loaded.submitted_at.is_some());
    }

    #[test]
    fn update_missing_quiz_fails_not_found() {
        let conn = open_memory_database().unwrap();
        let quiz = sample_quiz(Uuid::new_v4());
        let err = update_quiz(&conn, &quiz).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn list_by_status_filters() {
        let conn = open_memory_database().unwrap();
        let owner = Uuid::new_v4();
        let draft = sample_quiz(owner);
        insert_quiz(&conn, &draft).unwrap();

        let mut submitted = sample_quiz(owner);
        submitted.workflow_status = WorkflowStatus::Submitted;
        insert_quiz(&conn, &submitted).unwrap();

        let drafts = list_quizzes_by_status(&conn, &WorkflowStatus::Draft).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, draft.id);
    }
}
