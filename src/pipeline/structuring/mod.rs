pub mod client;
pub mod orchestrator;
pub mod types;

pub use client::*;
pub use orchestrator::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Structuring service is not reachable at {0}")]
    Connection(String),

    #[error("Structuring service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed structuring response: {0}")]
    MalformedResponse(String),

    #[error("Input text too short for structuring (< {min} characters)")]
    InputTooShort { min: usize },
}
