use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quiz::{QuestionWithOptions, Quiz};

/// Immutable point-in-time copy of a quiz and its full question tree.
/// Append-only; `version_number` is monotonic per quiz starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizVersion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub version_number: i64,
    pub snapshot: QuizSnapshotDoc,
    pub created_by: Uuid,
    pub reason: String,
    pub created_at: NaiveDateTime,
}

/// The composite document captured by one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSnapshotDoc {
    pub quiz: Quiz,
    /// Questions in `order_index` order, each with its options.
    pub questions: Vec<QuestionWithOptions>,
}

/// Version listing entry; the full snapshot body is not materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizVersionSummary {
    pub version_number: i64,
    pub created_at: NaiveDateTime,
    pub created_by: Uuid,
    pub reason: String,
}
