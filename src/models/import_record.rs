use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ImportStatus;
use super::payloads::{AiSuggested, RawExtract};

/// Where an uploaded document lives in the blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub bucket: String,
    pub path: String,
    /// MIME type declared at upload; dispatch fallback when the file
    /// extension is unrecognized.
    pub mime: Option<String>,
}

/// Lifecycle record for one uploaded document, from raw bytes to a
/// curator-approved candidate set. Never deleted by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: Uuid,
    pub created_by: Uuid,
    pub source: SourceLocation,
    pub status: ImportStatus,
    pub raw_extract: Option<RawExtract>,
    pub ai_suggested: Option<AiSuggested>,
    /// Curator sign-off payload. Free-form: only presence is enforced at
    /// finalize time; shape is validated where consumed.
    pub final_approved: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
