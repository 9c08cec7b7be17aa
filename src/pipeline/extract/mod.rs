//! Per-format extractors producing a normalized raw extract.
//!
//! Dispatch is by file extension, with the declared MIME type as fallback
//! when the extension says nothing. Re-running extraction overwrites the
//! previous extract and rewinds the record to EXTRACTED from any stage.

pub mod delimited;
pub mod pdf;
pub mod spreadsheet;
pub mod text;

use rusqlite::Connection;
use uuid::Uuid;

use crate::audit;
use crate::blob::BlobStore;
use crate::db::repository;
use crate::models::enums::ImportStatus;
use crate::models::import_record::ImportRecord;
use crate::models::payloads::CandidateQuestion;
use super::ImportError;

/// Broad source formats this pipeline can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
    Pdf,
    PlainText,
}

/// Resolve the extractor for a source document.
///
/// The file extension decides; when it maps to nothing we fall back to the
/// MIME type declared at upload. Unrecognized on both counts is a hard
/// `UnsupportedFormat` — no state change.
pub fn resolve_format(path: &str, declared_mime: Option<&str>) -> Result<SourceFormat, ImportError> {
    let extension_mime = mime_guess::from_path(path).first_raw();

    if let Some(format) = extension_mime.and_then(format_for_mime) {
        return Ok(format);
    }
    if let Some(format) = declared_mime.and_then(format_for_mime) {
        return Ok(format);
    }

    Err(ImportError::UnsupportedFormat(format!(
        "{path} (declared MIME: {})",
        declared_mime.unwrap_or("none")
    )))
}

fn format_for_mime(mime: &str) -> Option<SourceFormat> {
    match mime {
        "text/csv" | "text/tab-separated-values" => Some(SourceFormat::Delimited),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        | "application/vnd.ms-excel" => Some(SourceFormat::Spreadsheet),
        "application/pdf" => Some(SourceFormat::Pdf),
        "text/plain" | "text/markdown" => Some(SourceFormat::PlainText),
        _ => None,
    }
}

/// Fetch an import's source bytes, run the matching extractor, and persist
/// the result with status EXTRACTED. Replayable: a re-run overwrites the
/// prior extract regardless of how far the record had advanced.
pub fn extract_import(
    conn: &Connection,
    blob: &dyn BlobStore,
    import_id: &Uuid,
    purpose: Option<&str>,
) -> Result<ImportRecord, ImportError> {
    let record = repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))?;

    // Resolve the extractor before touching the blob store, so an
    // unsupported format never costs a download.
    let format = resolve_format(&record.source.path, record.source.mime.as_deref())?;

    let bytes = blob.download(&record.source.bucket, &record.source.path)?;

    let extract = match format {
        SourceFormat::Delimited => delimited::extract(&bytes)?,
        SourceFormat::Spreadsheet => spreadsheet::extract(&bytes)?,
        SourceFormat::Pdf => pdf::extract(&bytes)?,
        SourceFormat::PlainText => text::extract(&bytes),
    };

    repository::update_extract_stage(conn, import_id, &extract)?;

    tracing::info!(
        import_id = %import_id,
        kind = extract.kind(),
        purpose = purpose.unwrap_or("default"),
        "Import extracted"
    );
    audit::record(
        conn,
        &record.created_by,
        "import:extract",
        "ImportRecord",
        import_id,
        Some(serde_json::json!({ "status": record.status.as_str() })),
        Some(serde_json::json!({
            "status": ImportStatus::Extracted.as_str(),
            "kind": extract.kind(),
        })),
    );

    repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))
}

/// Turn raw tabular rows into candidate questions.
///
/// Shared by the delimited and spreadsheet extractors. A leading header row
/// (first cell naming the prompt column) is skipped. Columns are positional:
/// prompt, options A–E, correct letter, explanation. Blank rows are dropped;
/// per-candidate validity is judged later, at apply time.
pub(crate) fn candidates_from_rows(rows: &[Vec<String>]) -> Vec<CandidateQuestion> {
    let mut candidates = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if i == 0 && is_header_row(row) {
            continue;
        }
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cell = |idx: usize| -> String {
            row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
        };
        let optional = |idx: usize| -> Option<String> {
            let value = cell(idx);
            if value.is_empty() { None } else { Some(value) }
        };

        candidates.push(CandidateQuestion {
            prompt: cell(0),
            options: (1..=5).map(cell).collect(),
            correct: optional(6).map(|s| s.to_uppercase()),
            explanation: optional(7),
        });
    }

    candidates
}

fn is_header_row(row: &[String]) -> bool {
    row.first()
        .map(|cell| {
            let lower = cell.trim().to_lowercase();
            lower == "prompt" || lower == "question" || lower == "question_text"
        })
        .unwrap_or(false)
}
