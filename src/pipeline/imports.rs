//! Import record lifecycle: creation on upload and the curator's finalize
//! checkpoint.

use rusqlite::Connection;
use uuid::Uuid;

use crate::audit;
use crate::db::repository;
use crate::identity::Caller;
use crate::models::enums::ImportStatus;
use crate::models::import_record::{ImportRecord, SourceLocation};

use super::ImportError;

/// Register an uploaded document. The bytes themselves already live in the
/// blob store; this only creates the lifecycle record at UPLOADED.
pub fn create_import(
    conn: &Connection,
    caller: &Caller,
    source: SourceLocation,
) -> Result<ImportRecord, ImportError> {
    let now = chrono::Local::now().naive_local();
    let record = ImportRecord {
        id: Uuid::new_v4(),
        created_by: caller.id,
        source,
        status: ImportStatus::Uploaded,
        raw_extract: None,
        ai_suggested: None,
        final_approved: None,
        created_at: now,
        updated_at: now,
    };

    repository::insert_import_record(conn, &record)?;

    tracing::info!(
        import_id = %record.id,
        bucket = %record.source.bucket,
        path = %record.source.path,
        "Import record created"
    );
    audit::record(
        conn,
        &caller.id,
        "import:create",
        "ImportRecord",
        &record.id,
        None,
        Some(serde_json::json!({ "status": record.status.as_str() })),
    );

    Ok(record)
}

/// Record the curator's sign-off payload as FINAL_APPROVED.
///
/// This is a checkpoint, not a validity gate: beyond presence, no schema is
/// enforced here. Validity is judged where the payload is consumed.
pub fn finalize_import(
    conn: &Connection,
    caller: &Caller,
    import_id: &Uuid,
    payload: serde_json::Value,
) -> Result<ImportRecord, ImportError> {
    if payload.is_null() {
        return Err(ImportError::ValidationFailed(
            "finalize payload must be present".into(),
        ));
    }

    let record = repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))?;
    let before_status = record.status.as_str();

    repository::update_final_stage(conn, import_id, &payload)?;

    tracing::info!(import_id = %import_id, "Import finalized by curator");
    audit::record(
        conn,
        &caller.id,
        "import:finalize",
        "ImportRecord",
        import_id,
        Some(serde_json::json!({ "status": before_status })),
        Some(serde_json::json!({ "status": ImportStatus::FinalApproved.as_str() })),
    );

    repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))
}
