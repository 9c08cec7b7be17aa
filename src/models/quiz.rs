use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DifficultyTier, WorkflowStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub workflow_status: WorkflowStatus,
    pub submitted_at: Option<NaiveDateTime>,
    pub submitted_by: Option<Uuid>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<Uuid>,
    pub review_message: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub published_by: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub prompt: String,
    pub difficulty: DifficultyTier,
    /// Dense zero-based display position within the quiz.
    pub order_index: i64,
    pub created_by: Uuid,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// A question together with its options, as stored and displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionWithOptions {
    pub question: QuizQuestion,
    pub options: Vec<QuizOption>,
}
