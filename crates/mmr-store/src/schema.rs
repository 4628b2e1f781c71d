//! SQLite schema of the resonance database.

use mmr_core::errors::{ErrorInfo, MmrError};
use rusqlite::{params, Connection, OptionalExtension};

/// Version stored in the `meta` table.
pub const SCHEMA_VERSION: i64 = 1;

pub(crate) fn sql_error(code: &str, err: impl ToString) -> MmrError {
    MmrError::Storage(ErrorInfo::new(code, err.to_string()))
}

/// Creates missing tables and checks the schema version.
pub fn init_schema(conn: &Connection) -> Result<(), MmrError> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE IF NOT EXISTS meta(version INTEGER NOT NULL);
        CREATE TABLE IF NOT EXISTS resonances(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identity TEXT NOT NULL UNIQUE,
            asteroid TEXT NOT NULL,
            body TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS resonances_asteroid ON resonances(asteroid);
        CREATE TABLE IF NOT EXISTS phases(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resonance_id INTEGER NOT NULL,
            time REAL NOT NULL,
            value REAL NOT NULL,
            FOREIGN KEY(resonance_id) REFERENCES resonances(id)
        );
        CREATE INDEX IF NOT EXISTS phases_resonance ON phases(resonance_id);
        CREATE TABLE IF NOT EXISTS librations(
            resonance_id INTEGER NOT NULL,
            convention INTEGER NOT NULL,
            asteroid TEXT NOT NULL,
            kind TEXT NOT NULL,
            percentage REAL NOT NULL,
            max_diff REAL NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(resonance_id, convention),
            FOREIGN KEY(resonance_id) REFERENCES resonances(id)
        );
        COMMIT;",
    )
    .map_err(|err| sql_error("mmr_store.schema", err))?;
    set_version(conn, SCHEMA_VERSION)
}

fn set_version(conn: &Connection, version: i64) -> Result<(), MmrError> {
    let existing: Option<i64> = conn
        .query_row("SELECT version FROM meta LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(|err| sql_error("mmr_store.schema", err))?;
    match existing {
        Some(current) if current == version => Ok(()),
        Some(current) => Err(MmrError::Storage(ErrorInfo::new(
            "mmr_store.schema_version",
            format!("database schema {current} incompatible with expected {version}"),
        ))),
        None => {
            conn.execute("INSERT INTO meta(version) VALUES (?)", params![version])
                .map_err(|err| sql_error("mmr_store.schema", err))?;
            Ok(())
        }
    }
}
