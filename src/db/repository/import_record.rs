use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ImportStatus;
use crate::models::import_record::{ImportRecord, SourceLocation};
use crate::models::payloads::{AiSuggested, RawExtract};

pub fn insert_import_record(conn: &Connection, rec: &ImportRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO import_records (id, created_by, source_bucket, source_path, source_mime,
         status, raw_extract, ai_suggested, final_approved, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            rec.id.to_string(),
            rec.created_by.to_string(),
            rec.source.bucket,
            rec.source.path,
            rec.source.mime,
            rec.status.as_str(),
            rec.raw_extract.as_ref().map(to_json).transpose()?,
            rec.ai_suggested.as_ref().map(to_json).transpose()?,
            rec.final_approved.as_ref().map(to_json).transpose()?,
            format_ts(&rec.created_at),
            format_ts(&rec.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_import_record(conn: &Connection, id: &Uuid) -> Result<Option<ImportRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, created_by, source_bucket, source_path, source_mime,
         status, raw_extract, ai_suggested, final_approved, created_at, updated_at
         FROM import_records WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(ImportRow {
            id: row.get::<_, String>(0)?,
            created_by: row.get::<_, String>(1)?,
            source_bucket: row.get::<_, String>(2)?,
            source_path: row.get::<_, String>(3)?,
            source_mime: row.get::<_, Option<String>>(4)?,
            status: row.get::<_, String>(5)?,
            raw_extract: row.get::<_, Option<String>>(6)?,
            ai_suggested: row.get::<_, Option<String>>(7)?,
            final_approved: row.get::<_, Option<String>>(8)?,
            created_at: row.get::<_, String>(9)?,
            updated_at: row.get::<_, String>(10)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(import_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite the raw extract and reset status to EXTRACTED, regardless of
/// prior stage. Extraction is replayable.
pub fn update_extract_stage(
    conn: &Connection,
    id: &Uuid,
    extract: &RawExtract,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE import_records SET raw_extract = ?2, status = ?3, updated_at = datetime('now')
         WHERE id = ?1",
        params![id.to_string(), to_json(extract)?, ImportStatus::Extracted.as_str()],
    )?;
    require_row(rows, id)
}

pub fn update_suggested_stage(
    conn: &Connection,
    id: &Uuid,
    suggested: &AiSuggested,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE import_records SET ai_suggested = ?2, status = ?3, updated_at = datetime('now')
         WHERE id = ?1",
        params![id.to_string(), to_json(suggested)?, ImportStatus::AiSuggested.as_str()],
    )?;
    require_row(rows, id)
}

pub fn update_final_stage(
    conn: &Connection,
    id: &Uuid,
    payload: &serde_json::Value,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE import_records SET final_approved = ?2, status = ?3, updated_at = datetime('now')
         WHERE id = ?1",
        params![id.to_string(), to_json(payload)?, ImportStatus::FinalApproved.as_str()],
    )?;
    require_row(rows, id)
}

fn require_row(rows: usize, id: &Uuid) -> Result<(), DatabaseError> {
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "ImportRecord".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::MalformedPayload {
        column: "json".into(),
        reason: e.to_string(),
    })
}

// Internal row type for ImportRecord mapping
struct ImportRow {
    id: String,
    created_by: String,
    source_bucket: String,
    source_path: String,
    source_mime: Option<String>,
    status: String,
    raw_extract: Option<String>,
    ai_suggested: Option<String>,
    final_approved: Option<String>,
    created_at: String,
    updated_at: String,
}

fn import_from_row(row: ImportRow) -> Result<ImportRecord, DatabaseError> {
    let raw_extract = row
        .raw_extract
        .as_deref()
        .map(|s| parse_json::<RawExtract>("raw_extract", s))
        .transpose()?;
    let ai_suggested = row
        .ai_suggested
        .as_deref()
        .map(|s| parse_json::<AiSuggested>("ai_suggested", s))
        .transpose()?;
    let final_approved = row
        .final_approved
        .as_deref()
        .map(|s| parse_json::<serde_json::Value>("final_approved", s))
        .transpose()?;

    Ok(ImportRecord {
        id: parse_uuid(&row.id)?,
        created_by: parse_uuid(&row.created_by)?,
        source: SourceLocation {
            bucket: row.source_bucket,
            path: row.source_path,
            mime: row.source_mime,
        },
        status: ImportStatus::from_str(&row.status)?,
        raw_extract,
        ai_suggested,
        final_approved,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(column: &str, s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::MalformedPayload {
        column: column.into(),
        reason: e.to_string(),
    })
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .unwrap_or_default()
}
