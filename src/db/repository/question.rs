use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::DifficultyTier;
use crate::models::quiz::{QuestionWithOptions, QuizOption, QuizQuestion};

use super::import_record::{format_ts, parse_ts, parse_uuid};

pub fn insert_question(conn: &Connection, q: &QuizQuestion) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO quiz_questions (id, quiz_id, prompt, difficulty, order_index, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            q.id.to_string(),
            q.quiz_id.to_string(),
            q.prompt,
            q.difficulty.as_str(),
            q.order_index,
            q.created_by.to_string(),
            format_ts(&q.created_at),
        ],
    )?;
    Ok(())
}

pub fn insert_option(conn: &Connection, opt: &QuizOption) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO quiz_options (id, question_id, text, is_correct, explanation)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            opt.id.to_string(),
            opt.question_id.to_string(),
            opt.text,
            opt.is_correct as i32,
            opt.explanation,
        ],
    )?;
    Ok(())
}

pub fn get_question(conn: &Connection, id: &Uuid) -> Result<Option<QuizQuestion>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, quiz_id, prompt, difficulty, order_index, created_by, created_at
         FROM quiz_questions WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    });
    match result {
        Ok(row) => Ok(Some(question_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Questions for a quiz in display order, each with its options.
pub fn get_questions_with_options(
    conn: &Connection,
    quiz_id: &Uuid,
) -> Result<Vec<QuestionWithOptions>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, quiz_id, prompt, difficulty, order_index, created_by, created_at
         FROM quiz_questions WHERE quiz_id = ?1 ORDER BY order_index ASC",
    )?;
    let rows = stmt.query_map(params![quiz_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let question = question_from_row(row?)?;
        let options = get_options(conn, &question.id)?;
        out.push(QuestionWithOptions { question, options });
    }
    Ok(out)
}

pub fn get_options(conn: &Connection, question_id: &Uuid) -> Result<Vec<QuizOption>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, question_id, text, is_correct, explanation
         FROM quiz_options WHERE question_id = ?1 ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![question_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i32>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut options = Vec::new();
    for row in rows {
        let (id, question_id, text, is_correct, explanation) = row?;
        options.push(QuizOption {
            id: parse_uuid(&id)?,
            question_id: parse_uuid(&question_id)?,
            text,
            is_correct: is_correct != 0,
            explanation,
        });
    }
    Ok(options)
}

pub fn count_questions(conn: &Connection, quiz_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM quiz_questions WHERE quiz_id = ?1",
        params![quiz_id.to_string()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

/// Highest order_index in the quiz, or None when the quiz has no questions.
pub fn max_order_index(conn: &Connection, quiz_id: &Uuid) -> Result<Option<i64>, DatabaseError> {
    let max = conn.query_row(
        "SELECT MAX(order_index) FROM quiz_questions WHERE quiz_id = ?1",
        params![quiz_id.to_string()],
        |row| row.get::<_, Option<i64>>(0),
    )?;
    Ok(max)
}

pub fn update_question_prompt(
    conn: &Connection,
    question_id: &Uuid,
    prompt: &str,
    difficulty: &DifficultyTier,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE quiz_questions SET prompt = ?2, difficulty = ?3 WHERE id = ?1",
        params![question_id.to_string(), prompt, difficulty.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "QuizQuestion".into(),
            id: question_id.to_string(),
        });
    }
    Ok(())
}

/// Replace all options of a question in one pass.
pub fn replace_options(
    conn: &Connection,
    question_id: &Uuid,
    options: &[QuizOption],
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM quiz_options WHERE question_id = ?1",
        params![question_id.to_string()],
    )?;
    for opt in options {
        insert_option(conn, opt)?;
    }
    Ok(())
}

pub fn delete_question(conn: &Connection, question_id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "DELETE FROM quiz_questions WHERE id = ?1",
        params![question_id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "QuizQuestion".into(),
            id: question_id.to_string(),
        });
    }
    Ok(())
}

/// Close order_index gaps after a deletion so the sequence stays dense.
pub fn compact_order_indexes(conn: &Connection, quiz_id: &Uuid) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM quiz_questions WHERE quiz_id = ?1 ORDER BY order_index ASC",
    )?;
    let ids: Vec<String> = stmt
        .query_map(params![quiz_id.to_string()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    for (index, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE quiz_questions SET order_index = ?2 WHERE id = ?1",
            params![id, index as i64],
        )?;
    }
    Ok(())
}

fn question_from_row(
    row: (String, String, String, String, i64, String, String),
) -> Result<QuizQuestion, DatabaseError> {
    let (id, quiz_id, prompt, difficulty, order_index, created_by, created_at) = row;
    Ok(QuizQuestion {
        id: parse_uuid(&id)?,
        quiz_id: parse_uuid(&quiz_id)?,
        prompt,
        difficulty: DifficultyTier::from_str(&difficulty)?,
        order_index,
        created_by: parse_uuid(&created_by)?,
        created_at: parse_ts(&created_at),
    })
}
