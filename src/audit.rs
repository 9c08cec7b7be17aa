//! Best-effort audit sink.
//!
//! Every state-changing operation records an entry after its primary write
//! succeeds. A failed audit write is logged and swallowed — history is
//! valuable but never a hard dependency of the operation itself.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::audit::{insert_audit_entry, AuditRow};

/// Record a state change. Never fails; errors are logged at warn.
pub fn record(
    conn: &Connection,
    actor: &Uuid,
    action: &str,
    entity_type: &str,
    entity_id: &Uuid,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
) {
    let entry = AuditRow {
        actor: actor.to_string(),
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        before_state: before.map(|v| v.to_string()),
        after_state: after.map(|v| v.to_string()),
    };

    if let Err(e) = insert_audit_entry(conn, &entry) {
        tracing::warn!(
            action,
            entity_type,
            entity_id = %entity_id,
            error = %e,
            "Audit write failed; continuing"
        );
    }
}
