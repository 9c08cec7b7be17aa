pub mod apply;
pub mod extract;
pub mod imports;
pub mod structuring;

pub use apply::*;
pub use extract::*;
pub use imports::*;

use thiserror::Error;
use uuid::Uuid;

use crate::blob::BlobError;
use crate::db::DatabaseError;
use structuring::StructuringError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Import record not found: {0}")]
    ImportNotFound(Uuid),

    #[error("Quiz not found: {0}")]
    QuizNotFound(Uuid),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Import {import_id} has no {stage} payload")]
    MissingStage { import_id: Uuid, stage: &'static str },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Malformed {format} content: {reason}")]
    MalformedContent { format: &'static str, reason: String },

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    #[error("Structuring collaborator error: {0}")]
    Structuring(#[from] StructuringError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
