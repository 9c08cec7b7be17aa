use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
        (2, include_str!("../../resources/migrations/002_audit_log.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // import_records + quizzes + quiz_questions + quiz_options
        // + quiz_versions + audit_log + schema_version = 7
        // (plus sqlite_sequence from the audit AUTOINCREMENT)
        let count = count_tables(&conn).unwrap();
        assert!(count >= 7, "Expected at least 7 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn database_opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizforge.db");
        let conn = open_database(&path).unwrap();
        assert!(count_tables(&conn).unwrap() >= 7);
        drop(conn);

        // Re-open — migrations must be idempotent across restarts
        let conn2 = open_database(&path).unwrap();
        assert!(count_tables(&conn2).unwrap() >= 7);
    }

    #[test]
    fn workflow_status_check_constraint() {
        let conn = open_memory_database().unwrap();
        let result = conn.execute(
            "INSERT INTO quizzes (id, title, owner_id, workflow_status, created_at, updated_at)
             VALUES ('q1', 'Test', 'u1', 'LIMBO', datetime('now'), datetime('now'))",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn version_number_unique_per_quiz() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO quizzes (id, title, owner_id, created_at, updated_at)
             VALUES ('q1', 'Test', 'u1', datetime('now'), datetime('now'))",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO quiz_versions (id, quiz_id, version_number, snapshot, created_by, reason, created_at)
             VALUES ('v1', 'q1', 1, '{}', 'u1', 'test', datetime('now'))",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO quiz_versions (id, quiz_id, version_number, snapshot, created_by, reason, created_at)
             VALUES ('v2', 'q1', 1, '{}', 'u1', 'test', datetime('now'))",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn deleting_quiz_cascades_to_questions_and_versions() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO quizzes (id, title, owner_id, created_at, updated_at)
             VALUES ('q1', 'Test', 'u1', datetime('now'), datetime('now'))",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO quiz_questions (id, quiz_id, prompt, order_index, created_by, created_at)
             VALUES ('qq1', 'q1', 'Prompt', 0, 'u1', datetime('now'))",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO quiz_options (id, question_id, text, is_correct)
             VALUES ('o1', 'qq1', 'A', 1)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM quizzes WHERE id = 'q1'", []).unwrap();

        let questions: i64 = conn
            .query_row("SELECT COUNT(*) FROM quiz_questions", [], |row| row.get(0))
            .unwrap();
        let options: i64 = conn
            .query_row("SELECT COUNT(*) FROM quiz_options", [], |row| row.get(0))
            .unwrap();
        assert_eq!(questions, 0);
        assert_eq!(options, 0);
    }
}
