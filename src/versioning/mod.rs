//! Version snapshot service: immutable, monotonically numbered copies of a
//! quiz and its full question tree, taken before risky edits.

pub mod locks;

pub use locks::QuizLocks;

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::snapshot::{QuizSnapshotDoc, QuizVersion, QuizVersionSummary};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Quiz not found: {0}")]
    QuizNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Outcome of one snapshot call.
#[derive(Debug, Clone)]
pub struct SnapshotReceipt {
    pub version_number: i64,
}

/// Capture the current quiz state as the next version.
///
/// Read-then-append on the per-quiz version counter, so the whole call runs
/// inside the quiz's critical section. Not idempotent: a retry after an
/// uncertain failure may record a duplicate version, which the best-effort
/// history policy accepts.
pub fn snapshot_quiz(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    quiz_id: &Uuid,
    actor: &Uuid,
    reason: &str,
) -> Result<SnapshotReceipt, SnapshotError> {
    let lock = quiz_locks.for_quiz(quiz_id);
    let _guard = locks::acquire(&lock);

    let quiz = repository::get_quiz(conn, quiz_id)?.ok_or(SnapshotError::QuizNotFound(*quiz_id))?;
    let questions = repository::get_questions_with_options(conn, quiz_id)?;

    let version_number = repository::max_version_number(conn, quiz_id)? + 1;
    let version = QuizVersion {
        id: Uuid::new_v4(),
        quiz_id: *quiz_id,
        version_number,
        snapshot: QuizSnapshotDoc { quiz, questions },
        created_by: *actor,
        reason: reason.to_string(),
        created_at: chrono::Local::now().naive_local(),
    };
    repository::insert_version(conn, &version)?;

    tracing::debug!(quiz_id = %quiz_id, version = version_number, reason, "Quiz snapshot taken");

    Ok(SnapshotReceipt { version_number })
}

/// Best-effort snapshot for use inside workflow transitions: failures are
/// logged and swallowed, never surfaced to the caller.
pub fn snapshot_quiz_best_effort(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    quiz_id: &Uuid,
    actor: &Uuid,
    reason: &str,
) {
    if let Err(e) = snapshot_quiz(conn, quiz_locks, quiz_id, actor, reason) {
        tracing::warn!(quiz_id = %quiz_id, reason, error = %e, "Snapshot failed; continuing");
    }
}

pub fn list_quiz_versions(
    conn: &Connection,
    quiz_id: &Uuid,
) -> Result<Vec<QuizVersionSummary>, SnapshotError> {
    Ok(repository::list_versions(conn, quiz_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{DifficultyTier, WorkflowStatus};
    use crate::models::quiz::{Quiz, QuizOption, QuizQuestion};

    fn seeded_quiz(conn: &Connection) -> Quiz {
        let now = chrono::Local::now().naive_local();
        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: "Snapshot target".into(),
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
        repository::insert_quiz(conn, &quiz).unwrap();
        quiz
    }

    fn add_question(conn: &Connection, quiz: &Quiz, index: i64) {
        let question = QuizQuestion {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            prompt: format!("Q{index}"),
            difficulty: DifficultyTier::Basic,
            order_index: index,
            created_by: quiz.owner_id,
            created_at: chrono::Local::now().naive_local(),
        };
        repository::insert_question(conn, &question).unwrap();
        for i in 0..4 {
            repository::insert_option(
                conn,
                &QuizOption {
                    id: Uuid::new_v4(),
                    question_id: question.id,
                    text: format!("opt{i}"),
                    is_correct: i == 0,
                    explanation: None,
                },
            )
            .unwrap();
        }
    }

    #[test]
    fn consecutive_snapshots_number_one_then_two() {
        let conn = open_memory_database().unwrap();
        let quiz_locks = QuizLocks::new();
        let quiz = seeded_quiz(&conn);
        let actor = Uuid::new_v4();

        let first = snapshot_quiz(&conn, &quiz_locks, &quiz.id, &actor, "pre-publish").unwrap();
        let second = snapshot_quiz(&conn, &quiz_locks, &quiz.id, &actor, "pre-publish").unwrap();
        assert_eq!(first.version_number, 1);
        assert_eq!(second.version_number, 2);
    }

    #[test]
    fn snapshot_captures_full_question_tree_in_order() {
        let conn = open_memory_database().unwrap();
        let quiz_locks = QuizLocks::new();
        let quiz = seeded_quiz(&conn);
        for index in 0..3 {
            add_question(&conn, &quiz, index);
        }

        let receipt =
            snapshot_quiz(&conn, &quiz_locks, &quiz.id, &quiz.owner_id, "edit:APPROVED").unwrap();

        let stored = repository::get_version(&conn, &quiz.id, receipt.version_number)
            .unwrap()
            .unwrap();
        assert_eq!(stored.reason, "edit:APPROVED");
        assert_eq!(stored.snapshot.questions.len(), 3);
        let indexes: Vec<i64> = stored
            .snapshot
            .questions
            .iter()
            .map(|q| q.question.order_index)
            .collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(stored.snapshot.questions[0].options.len(), 4);
    }

    #[test]
    fn versions_are_per_quiz() {
        let conn = open_memory_database().unwrap();
        let quiz_locks = QuizLocks::new();
        let quiz_a = seeded_quiz(&conn);
        let quiz_b = seeded_quiz(&conn);
        let actor = Uuid::new_v4();

        snapshot_quiz(&conn, &quiz_locks, &quiz_a.id, &actor, "a").unwrap();
        snapshot_quiz(&conn, &quiz_locks, &quiz_a.id, &actor, "a").unwrap();
        let receipt = snapshot_quiz(&conn, &quiz_locks, &quiz_b.id, &actor, "b").unwrap();
        assert_eq!(receipt.version_number, 1);
    }

    #[test]
    fn snapshot_missing_quiz_fails() {
        let conn = open_memory_database().unwrap();
        let quiz_locks = QuizLocks::new();
        let err = snapshot_quiz(&conn, &quiz_locks, &Uuid::new_v4(), &Uuid::new_v4(), "x")
            .unwrap_err();
        assert!(matches!(err, SnapshotError::QuizNotFound(_)));
    }

    #[test]
    fn best_effort_swallow_never_panics() {
        let conn = open_memory_database().unwrap();
        let quiz_locks = QuizLocks::new();
        // Missing quiz — failure must be swallowed
        snapshot_quiz_best_effort(&conn, &quiz_locks, &Uuid::new_v4(), &Uuid::new_v4(), "x");
    }

    #[test]
    fn list_summaries_newest_first() {
        let conn = open_memory_database().unwrap();
        let quiz_locks = QuizLocks::new();
        let quiz = seeded_quiz(&conn);
        let actor = Uuid::new_v4();
        for reason in ["first", "second"] {
            snapshot_quiz(&conn, &quiz_locks, &quiz.id, &actor, reason).unwrap();
        }

        let listed = list_quiz_versions(&conn, &quiz.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].version_number, 2);
        assert_eq!(listed[0].reason, "second");
    }
}
