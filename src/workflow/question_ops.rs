//! Question editing under workflow guards.
//!
//! Who may touch a quiz's questions depends on where the quiz sits in the
//! workflow, and edits past Draft leave a version snapshot behind. An
//! owner fixing a Rejected quiz additionally pulls it back to Draft.

use rusqlite::Connection;
use uuid::Uuid;

use crate::audit;
use crate::db::repository;
use crate::identity::Caller;
use crate::models::enums::{DifficultyTier, WorkflowStatus};
use crate::models::quiz::{Quiz, QuizOption, QuizQuestion};
use crate::versioning::{snapshot_quiz_best_effort, QuizLocks};

use super::{WorkflowError, MIN_OPTIONS_PUBLISHED};

/// Fewest options a question may carry before publication.
const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone)]
pub struct OptionInput {
    pub text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QuestionInput {
    pub prompt: String,
    pub difficulty: DifficultyTier,
    pub options: Vec<OptionInput>,
}

/// What an authorized edit entails beyond the mutation itself.
enum EditPolicy {
    /// Draft: mutate freely.
    Plain,
    /// Rejected, owner: snapshot first, then pull the quiz back to Draft.
    SnapshotAndRevert,
    /// Any later status, privileged caller: snapshot first.
    Snapshot,
}

/// Decide whether `caller` may edit `quiz`'s questions right now.
fn edit_policy(quiz: &Quiz, caller: &Caller) -> Result<EditPolicy, WorkflowError> {
    match quiz.workflow_status {
        WorkflowStatus::Draft => {
            if caller.owns(quiz) || caller.is_privileged() {
                Ok(EditPolicy::Plain)
            } else {
                Err(WorkflowError::Forbidden(
                    "editing a draft requires ownership or curator role".into(),
                ))
            }
        }
        WorkflowStatus::Rejected => {
            if caller.owns(quiz) {
                Ok(EditPolicy::SnapshotAndRevert)
            } else {
                Err(WorkflowError::Forbidden(
                    "only the owner may rework a rejected quiz".into(),
                ))
            }
        }
        _ => {
            if caller.is_privileged() {
                Ok(EditPolicy::Snapshot)
            } else {
                Err(WorkflowError::Forbidden(format!(
                    "editing a {} quiz requires curator or admin role",
                    quiz.workflow_status.as_str()
                )))
            }
        }
    }
}

fn validate_input(input: &QuestionInput, status: &WorkflowStatus) -> Result<(), WorkflowError> {
    if input.prompt.trim().is_empty() {
        return Err(WorkflowError::Validation("question prompt is empty".into()));
    }

    let min = if *status == WorkflowStatus::Published {
        MIN_OPTIONS_PUBLISHED
    } else {
        MIN_OPTIONS
    };
    let usable = input
        .options
        .iter()
        .filter(|o| !o.text.trim().is_empty())
        .count();
    if usable < min {
        return Err(WorkflowError::Validation(format!(
            "question needs at least {min} options, found {usable}"
        )));
    }

    let correct = input.options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
        return Err(WorkflowError::Validation(format!(
            "exactly one option must be correct, found {correct}"
        )));
    }
    Ok(())
}

/// Snapshot before the mutation and, for a Rejected owner edit, return
/// the quiz to Draft with the verdict cleared.
fn apply_policy(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    quiz: &Quiz,
    policy: &EditPolicy,
    verb: &str,
) -> Result<(), WorkflowError> {
    match policy {
        EditPolicy::Plain => Ok(()),
        EditPolicy::Snapshot | EditPolicy::SnapshotAndRevert => {
            snapshot_quiz_best_effort(
                conn,
                quiz_locks,
                &quiz.id,
                &caller.id,
                &format!("{verb}:{}", quiz.workflow_status.as_str()),
            );
            Ok(())
        }
    }
}

fn revert_if_needed(
    conn: &Connection,
    caller: &Caller,
    quiz: &Quiz,
    policy: &EditPolicy,
) -> Result<(), WorkflowError> {
    if !matches!(policy, EditPolicy::SnapshotAndRevert) {
        return Ok(());
    }
    let mut reverted = quiz.clone();
    reverted.workflow_status = WorkflowStatus::Draft;
    reverted.reviewed_at = None;
    reverted.reviewed_by = None;
    reverted.review_message = None;
    reverted.updated_at = chrono::Local::now().naive_local();
    repository::update_quiz(conn, &reverted)?;

    tracing::info!(quiz_id = %quiz.id, "Rejected quiz reworked, returned to draft");
    audit::record(
        conn,
        &caller.id,
        "quiz:rework",
        "Quiz",
        &quiz.id,
        Some(serde_json::json!({ "workflow_status": WorkflowStatus::Rejected.as_str() })),
        Some(serde_json::json!({ "workflow_status": WorkflowStatus::Draft.as_str() })),
    );
    Ok(())
}

fn build_options(question_id: &Uuid, inputs: &[OptionInput]) -> Vec<QuizOption> {
    inputs
        .iter()
        .filter(|o| !o.text.trim().is_empty())
        .map(|o| QuizOption {
            id: Uuid::new_v4(),
            question_id: *question_id,
            text: o.text.trim().to_string(),
            is_correct: o.is_correct,
            explanation: o.explanation.clone(),
        })
        .collect()
}

/// Append a question at the next free `order_index`.
pub fn add_question(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    quiz_id: &Uuid,
    input: &QuestionInput,
) -> Result<QuizQuestion, WorkflowError> {
    let quiz = repository::get_quiz(conn, quiz_id)?.ok_or(WorkflowError::QuizNotFound(*quiz_id))?;
    let policy = edit_policy(&quiz, caller)?;
    validate_input(input, &quiz.workflow_status)?;

    apply_policy(conn, quiz_locks, caller, &quiz, &policy, "edit")?;

    let lock = quiz_locks.for_quiz(quiz_id);
    let _guard = crate::versioning::locks::acquire(&lock);

    let tx = conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;
    let order_index = repository::max_order_index(&tx, quiz_id)?
        .map(|max| max + 1)
        .unwrap_or(0);
    let question = QuizQuestion {
        id: Uuid::new_v4(),
        quiz_id: *quiz_id,
        prompt: input.prompt.trim().to_string(),
        difficulty: input.difficulty.clone(),
        order_index,
        created_by: caller.id,
        created_at: chrono::Local::now().naive_local(),
    };
    repository::insert_question(&tx, &question)?;
    for option in build_options(&question.id, &input.options) {
        repository::insert_option(&tx, &option)?;
    }
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    revert_if_needed(conn, caller, &quiz, &policy)?;

    audit::record(
        conn,
        &caller.id,
        "question:add",
        "QuizQuestion",
        &question.id,
        None,
        Some(serde_json::json!({ "quiz_id": quiz_id, "order_index": order_index })),
    );
    Ok(question)
}

/// Rewrite a question's prompt, difficulty, and full option set.
pub fn update_question(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    question_id: &Uuid,
    input: &QuestionInput,
) -> Result<(), WorkflowError> {
    let question = repository::get_question(conn, question_id)?
        .ok_or(WorkflowError::QuestionNotFound(*question_id))?;
    let quiz = repository::get_quiz(conn, &question.quiz_id)?
        .ok_or(WorkflowError::QuizNotFound(question.quiz_id))?;
    let policy = edit_policy(&quiz, caller)?;
    validate_input(input, &quiz.workflow_status)?;

    apply_policy(conn, quiz_locks, caller, &quiz, &policy, "edit")?;

    let tx = conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;
    repository::update_question_prompt(&tx, question_id, input.prompt.trim(), &input.difficulty)?;
    repository::replace_options(&tx, question_id, &build_options(question_id, &input.options))?;
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    revert_if_needed(conn, caller, &quiz, &policy)?;

    audit::record(
        conn,
        &caller.id,
        "question:update",
        "QuizQuestion",
        question_id,
        None,
        Some(serde_json::json!({ "quiz_id": quiz.id })),
    );
    Ok(())
}

/// Remove a question and close the `order_index` gap it leaves.
pub fn delete_question(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    question_id: &Uuid,
) -> Result<(), WorkflowError> {
    let question = repository::get_question(conn, question_id)?
        .ok_or(WorkflowError::QuestionNotFound(*question_id))?;
    let quiz = repository::get_quiz(conn, &question.quiz_id)?
        .ok_or(WorkflowError::QuizNotFound(question.quiz_id))?;
    let policy = edit_policy(&quiz, caller)?;

    apply_policy(conn, quiz_locks, caller, &quiz, &policy, "delete")?;

    let lock = quiz_locks.for_quiz(&quiz.id);
    let _guard = crate::versioning::locks::acquire(&lock);

    let tx = conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;
    repository::delete_question(&tx, question_id)?;
    repository::compact_order_indexes(&tx, &quiz.id)?;
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    revert_if_needed(conn, caller, &quiz, &policy)?;

    audit::record(
        conn,
        &caller.id,
        "question:delete",
        "QuizQuestion",
        question_id,
        Some(serde_json::json!({ "quiz_id": quiz.id })),
        None,
    );
    Ok(())
}
