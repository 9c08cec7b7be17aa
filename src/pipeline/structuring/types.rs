use serde::{Deserialize, Serialize};

use super::StructuringError;
use crate::models::payloads::CandidateQuestion;

/// Candidates produced by the structuring collaborator, tagged with the
/// model that generated them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredQuestions {
    pub model: String,
    pub questions: Vec<CandidateQuestion>,
}

/// Structuring/normalization collaborator abstraction (allows mocking).
pub trait StructuringClient {
    /// Turn free text into question candidates.
    fn structure(&self, text: &str) -> Result<StructuredQuestions, StructuringError>;

    /// Normalize a batch of display strings (title, prompts, options).
    /// Callers treat this as best-effort.
    fn proofread(&self, inputs: &[String]) -> Result<Vec<String>, StructuringError>;
}

/// Mock client returning canned output, or failing on demand.
pub struct MockStructuringClient {
    response: Result<StructuredQuestions, String>,
}

impl MockStructuringClient {
    pub fn with_questions(model: &str, questions: Vec<CandidateQuestion>) -> Self {
        Self {
            response: Ok(StructuredQuestions {
                model: model.to_string(),
                questions,
            }),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

impl StructuringClient for MockStructuringClient {
    fn structure(&self, _text: &str) -> Result<StructuredQuestions, StructuringError> {
        match &self.response {
            Ok(structured) => Ok(structured.clone()),
            Err(message) => Err(StructuringError::Service {
                status: 502,
                body: message.clone(),
            }),
        }
    }

    fn proofread(&self, inputs: &[String]) -> Result<Vec<String>, StructuringError> {
        match &self.response {
            // Trim-only normalization stands in for the real service
            Ok(_) => Ok(inputs.iter().map(|s| s.trim().to_string()).collect()),
            Err(message) => Err(StructuringError::Service {
                status: 502,
                body: message.clone(),
            }),
        }
    }
}
