//! Quiz-level workflow operations: create, submit, review, publish.

use rusqlite::Connection;
use uuid::Uuid;

use crate::audit;
use crate::db::repository;
use crate::identity::Caller;
use crate::models::enums::{ReviewDecision, WorkflowStatus};
use crate::models::quiz::Quiz;
use crate::pipeline::structuring::StructuringClient;
use crate::versioning::{snapshot_quiz_best_effort, QuizLocks};

use super::transitions::{authorize, WorkflowAction};
use super::{WorkflowError, MIN_OPTIONS_PUBLISHED};

/// Shortest acceptable quiz title after trimming.
const MIN_TITLE_LENGTH: usize = 3;
/// Shortest acceptable rejection message after trimming.
const MIN_REJECT_MESSAGE: usize = 4;

pub fn create_quiz(
    conn: &Connection,
    caller: &Caller,
    title: &str,
    description: Option<&str>,
) -> Result<Quiz, WorkflowError> {
    let title = title.trim();
    if title.len() < MIN_TITLE_LENGTH {
        return Err(WorkflowError::Validation(format!(
            "quiz title must be at least {MIN_TITLE_LENGTH} characters"
        )));
    }

    let now = chrono::Local::now().naive_local();
    let quiz = Quiz {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.map(str::trim).filter(|d| !d.is_empty()).map(String::from),
        owner_id: caller.id,
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
    repository::insert_quiz(conn, &quiz)?;

    tracing::info!(quiz_id = %quiz.id, owner = %caller.id, "Quiz created");
    audit::record(
        conn,
        &caller.id,
        "quiz:create",
        "Quiz",
        &quiz.id,
        None,
        Some(serde_json::json!({ "title": quiz.title })),
    );
    Ok(quiz)
}

fn load_quiz(conn: &Connection, quiz_id: &Uuid) -> Result<Quiz, WorkflowError> {
    repository::get_quiz(conn, quiz_id)?.ok_or(WorkflowError::QuizNotFound(*quiz_id))
}

fn store_transition(
    conn: &Connection,
    caller: &Caller,
    quiz: &Quiz,
    from: &WorkflowStatus,
    action: &WorkflowAction,
) -> Result<(), WorkflowError> {
    repository::update_quiz(conn, quiz)?;
    tracing::info!(
        quiz_id = %quiz.id,
        from = from.as_str(),
        to = quiz.workflow_status.as_str(),
        action = action.as_str(),
        "Workflow transition"
    );
    audit::record(
        conn,
        &caller.id,
        &format!("quiz:{}", action.as_str()),
        "Quiz",
        &quiz.id,
        Some(serde_json::json!({ "workflow_status": from.as_str() })),
        Some(serde_json::json!({ "workflow_status": quiz.workflow_status.as_str() })),
    );
    Ok(())
}

/// Owner hands the quiz to review. Clears any prior review verdict so a
/// resubmission after rejection starts clean.
pub fn submit_quiz(
    conn: &Connection,
    caller: &Caller,
    quiz_id: &Uuid,
) -> Result<Quiz, WorkflowError> {
    let mut quiz = load_quiz(conn, quiz_id)?;
    let from = quiz.workflow_status.clone();
    quiz.workflow_status = authorize(&quiz, caller, &WorkflowAction::Submit)?;

    let now = chrono::Local::now().naive_local();
    quiz.submitted_at = Some(now);
    quiz.submitted_by = Some(caller.id);
    quiz.reviewed_at = None;
    quiz.reviewed_by = None;
    quiz.review_message = None;
    quiz.updated_at = now;

    store_transition(conn, caller, &quiz, &from, &WorkflowAction::Submit)?;
    Ok(quiz)
}

/// Curator verdict on a submitted quiz. A rejection must carry a usable
/// message; an approval may omit it.
pub fn review_quiz(
    conn: &Connection,
    caller: &Caller,
    quiz_id: &Uuid,
    decision: &ReviewDecision,
    message: Option<&str>,
) -> Result<Quiz, WorkflowError> {
    let action = match decision {
        ReviewDecision::Approved => WorkflowAction::Approve,
        ReviewDecision::Rejected => WorkflowAction::Reject,
    };

    let message = message.map(str::trim).filter(|m| !m.is_empty());
    if matches!(decision, ReviewDecision::Rejected) {
        match message {
            Some(m) if m.len() >= MIN_REJECT_MESSAGE => {}
            _ => {
                return Err(WorkflowError::Validation(format!(
                    "rejection requires a message of at least {MIN_REJECT_MESSAGE} characters"
                )))
            }
        }
    }

    let mut quiz = load_quiz(conn, quiz_id)?;
    let from = quiz.workflow_status.clone();
    quiz.workflow_status = authorize(&quiz, caller, &action)?;

    let now = chrono::Local::now().naive_local();
    quiz.reviewed_at = Some(now);
    quiz.reviewed_by = Some(caller.id);
    quiz.review_message = message.map(String::from);
    quiz.updated_at = now;

    store_transition(conn, caller, &quiz, &from, &action)?;
    Ok(quiz)
}

/// Owner withdraws a quiz from the review queue before a verdict. The
/// submission stamp is cleared; a pre-revert snapshot preserves the
/// submitted shape.
pub fn unsubmit_quiz(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    quiz_id: &Uuid,
) -> Result<Quiz, WorkflowError> {
    let mut quiz = load_quiz(conn, quiz_id)?;
    let from = quiz.workflow_status.clone();
    quiz.workflow_status = authorize(&quiz, caller, &WorkflowAction::Unsubmit)?;

    snapshot_quiz_best_effort(conn, quiz_locks, quiz_id, &caller.id, "unsubmit");

    quiz.submitted_at = None;
    quiz.submitted_by = None;
    quiz.updated_at = chrono::Local::now().naive_local();

    store_transition(conn, caller, &quiz, &from, &WorkflowAction::Unsubmit)?;
    Ok(quiz)
}

/// Content gates shared by both publish entry points: at least one
/// question, each carrying the full published option set.
fn ensure_publishable(conn: &Connection, quiz_id: &Uuid) -> Result<(), WorkflowError> {
    let questions = repository::get_questions_with_options(conn, quiz_id)?;
    if questions.is_empty() {
        return Err(WorkflowError::InvalidState(
            "cannot publish a quiz with no questions".into(),
        ));
    }
    for entry in &questions {
        let usable = entry
            .options
            .iter()
            .filter(|o| !o.text.trim().is_empty())
            .count();
        if usable < MIN_OPTIONS_PUBLISHED {
            return Err(WorkflowError::Validation(format!(
                "question {} has {usable} options, published quizzes need {MIN_OPTIONS_PUBLISHED}",
                entry.question.id
            )));
        }
    }
    Ok(())
}

/// Make an approved quiz live.
///
/// Requires at least one question, each with the full option set. Takes a
/// pre-publish snapshot and runs a best-effort proofreading pass over the
/// quiz text; both are advisory and never block the transition.
pub fn publish_quiz(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    quiz_id: &Uuid,
    structuring: &dyn StructuringClient,
) -> Result<Quiz, WorkflowError> {
    let mut quiz = load_quiz(conn, quiz_id)?;
    let from = quiz.workflow_status.clone();
    quiz.workflow_status = authorize(&quiz, caller, &WorkflowAction::Publish)?;

    ensure_publishable(conn, quiz_id)?;

    snapshot_quiz_best_effort(conn, quiz_locks, quiz_id, &caller.id, "publish");
    proofread_content(conn, &mut quiz, structuring);

    let now = chrono::Local::now().naive_local();
    quiz.published_at = Some(now);
    quiz.published_by = Some(caller.id);
    quiz.updated_at = now;

    store_transition(conn, caller, &quiz, &from, &WorkflowAction::Publish)?;
    Ok(quiz)
}

/// Re-stamp an already-published quiz after later curator edits.
pub fn republish_quiz(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    quiz_id: &Uuid,
) -> Result<Quiz, WorkflowError> {
    let mut quiz = load_quiz(conn, quiz_id)?;
    let from = quiz.workflow_status.clone();
    quiz.workflow_status = authorize(&quiz, caller, &WorkflowAction::Republish)?;

    ensure_publishable(conn, quiz_id)?;

    snapshot_quiz_best_effort(conn, quiz_locks, quiz_id, &caller.id, "republish");

    let now = chrono::Local::now().naive_local();
    quiz.published_at = Some(now);
    quiz.published_by = Some(caller.id);
    quiz.updated_at = now;

    store_transition(conn, caller, &quiz, &from, &WorkflowAction::Republish)?;
    Ok(quiz)
}

/// Quizzes awaiting a curator verdict.
pub fn review_queue(conn: &Connection) -> Result<Vec<Quiz>, WorkflowError> {
    Ok(repository::list_quizzes_by_status(
        conn,
        &WorkflowStatus::Submitted,
    )?)
}

/// Run the structuring collaborator's proofreader over the quiz's visible
/// text: title, description, prompts, and option texts, in one batch.
/// Prompts and options are written back directly; title and description
/// are updated in place on `quiz` and persisted by the caller's store.
/// Failures are logged and swallowed.
fn proofread_content(conn: &Connection, quiz: &mut Quiz, structuring: &dyn StructuringClient) {
    let result = (|| -> Result<usize, WorkflowError> {
        let questions = repository::get_questions_with_options(conn, &quiz.id)?;

        let mut inputs = vec![
            quiz.title.clone(),
            quiz.description.clone().unwrap_or_default(),
        ];
        for entry in &questions {
            inputs.push(entry.question.prompt.clone());
            for option in &entry.options {
                inputs.push(option.text.clone());
            }
        }

        let cleaned = structuring
            .proofread(&inputs)
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;
        if cleaned.len() != inputs.len() {
            return Err(WorkflowError::Validation(format!(
                "proofread returned {} strings for {} inputs",
                cleaned.len(),
                inputs.len()
            )));
        }

        let mut cursor = cleaned.iter().map(|s| s.trim());
        let mut changed = 0;

        let title = cursor.next().unwrap_or_default();
        if !title.is_empty() && title != quiz.title {
            quiz.title = title.to_string();
            changed += 1;
        }
        let description = cursor.next().unwrap_or_default();
        if quiz.description.is_some()
            && !description.is_empty()
            && quiz.description.as_deref() != Some(description)
        {
            quiz.description = Some(description.to_string());
            changed += 1;
        }

        for entry in &questions {
            let prompt = cursor.next().unwrap_or_default();
            if !prompt.is_empty() && prompt != entry.question.prompt {
                repository::update_question_prompt(
                    conn,
                    &entry.question.id,
                    prompt,
                    &entry.question.difficulty,
                )?;
                changed += 1;
            }

            let mut options = entry.options.clone();
            let mut dirty = false;
            for option in &mut options {
                let text = cursor.next().unwrap_or_default();
                if !text.is_empty() && text != option.text {
                    option.text = text.to_string();
                    dirty = true;
                }
            }
            if dirty {
                repository::replace_options(conn, &entry.question.id, &options)?;
                changed += 1;
            }
        }
        Ok(changed)
    })();

    match result {
        Ok(changed) => {
            tracing::debug!(quiz_id = %quiz.id, changed, "Pre-publish proofread applied")
        }
        Err(e) => {
            tracing::warn!(quiz_id = %quiz.id, error = %e, "Pre-publish proofread failed; continuing")
        }
    }
}
