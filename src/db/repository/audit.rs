use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// One row destined for the audit_log table.
#[derive(Debug, Clone)]
pub struct AuditRow {
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
}

pub fn insert_audit_entry(conn: &Connection, entry: &AuditRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_log (actor, action, entity_type, entity_id, before_state, after_state)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.actor,
            entry.action,
            entry.entity_type,
            entry.entity_id,
            entry.before_state,
            entry.after_state,
        ],
    )?;
    Ok(())
}

/// Prune audit entries older than the given number of days.
pub fn prune_audit_log(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM audit_log WHERE timestamp < datetime('now', ?1)",
        params![format!("-{retention_days} days")],
    )?;
    Ok(deleted)
}

/// Query audit entries for one entity, newest first.
/// Returns (timestamp, actor, action) tuples.
pub fn query_audit_by_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<(String, String, String)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, actor, action FROM audit_log
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;
    let rows = stmt
        .query_map(params![entity_type, entity_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
