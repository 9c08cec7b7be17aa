//! Editorial workflow: the quiz state machine plus the guarded operations
//! that move quizzes and their questions through it.

pub mod question_ops;
pub mod quiz_ops;
pub mod transitions;

pub use question_ops::{OptionInput, QuestionInput};
pub use transitions::{Requirement, WorkflowAction};

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

/// Published questions hold the full option set. Enforced at the publish
/// transitions and on any edit made while live.
pub(crate) const MIN_OPTIONS_PUBLISHED: usize = 4;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Quiz not found: {0}")]
    QuizNotFound(Uuid),

    #[error("Question not found: {0}")]
    QuestionNotFound(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
