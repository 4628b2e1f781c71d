use std::path::Path;

use chrono::Utc;
use mmr_core::errors::{ErrorInfo, MmrError};
use mmr_core::{
    Convention, LibrationKind, LibrationRecord, LibrationStore, PhaseSample, PhaseStore,
    Resonance, ResonanceId, ResonanceStore,
};
use rusqlite::{params, Connection, OptionalExtension};

use crate::schema::{init_schema, sql_error};

fn convention_ordinal(convention: Convention) -> i64 {
    match convention {
        Convention::Pericentric => 0,
        Convention::Apocentric => 1,
    }
}

/// SQLite database holding resonances, phases and librations.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database file.
    pub fn open(path: &Path) -> Result<Self, MmrError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                MmrError::Storage(
                    ErrorInfo::new("mmr_store.open", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let conn = Connection::open(path).map_err(|err| {
            MmrError::Storage(
                ErrorInfo::new("mmr_store.open", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, MmrError> {
        let conn = Connection::open_in_memory().map_err(|err| sql_error("mmr_store.open", err))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, MmrError> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ResonanceStore for SqliteStore {
    fn persist_resonance(&mut self, resonance: &Resonance) -> Result<ResonanceId, MmrError> {
        let identity = resonance.to_string();
        let body = serde_json::to_string(resonance)
            .map_err(|err| sql_error("mmr_store.resonance_encode", err))?;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO resonances(identity, asteroid, body) VALUES (?, ?, ?)",
                params![identity, resonance.asteroid_name(), body],
            )
            .map_err(|err| sql_error("mmr_store.insert_resonance", err))?;
        let id: i64 = self
            .conn
            .query_row(
                "SELECT id FROM resonances WHERE identity = ?",
                params![identity],
                |row| row.get(0),
            )
            .map_err(|err| sql_error("mmr_store.insert_resonance", err))?;
        Ok(ResonanceId::from_raw(id))
    }

    fn resonance(&self, id: ResonanceId) -> Result<Option<Resonance>, MmrError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM resonances WHERE id = ?",
                params![id.as_raw()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| sql_error("mmr_store.resonance", err))?;
        body.map(|body| {
            serde_json::from_str(&body).map_err(|err| {
                MmrError::Storage(
                    ErrorInfo::new("mmr_store.resonance_decode", err.to_string())
                        .with_context("id", id.to_string()),
                )
            })
        })
        .transpose()
    }

    fn resonances_for(&self, asteroid: &str) -> Result<Vec<ResonanceId>, MmrError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM resonances WHERE asteroid = ? ORDER BY id")
            .map_err(|err| sql_error("mmr_store.resonances_for", err))?;
        let rows = stmt
            .query_map(params![asteroid], |row| Ok(ResonanceId::from_raw(row.get(0)?)))
            .map_err(|err| sql_error("mmr_store.resonances_for", err))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|err| sql_error("mmr_store.resonances_for", err))
    }
}

impl PhaseStore for SqliteStore {
    fn append(&mut self, id: ResonanceId, sample: PhaseSample) -> Result<(), MmrError> {
        self.conn
            .execute(
                "INSERT INTO phases(resonance_id, time, value) VALUES (?, ?, ?)",
                params![id.as_raw(), sample.time, sample.value],
            )
            .map_err(|err| sql_error("mmr_store.insert_phase", err))?;
        Ok(())
    }

    fn append_all(&mut self, id: ResonanceId, samples: &[PhaseSample]) -> Result<(), MmrError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|err| sql_error("mmr_store.insert_phase", err))?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO phases(resonance_id, time, value) VALUES (?, ?, ?)")
                .map_err(|err| sql_error("mmr_store.insert_phase", err))?;
            for sample in samples {
                stmt.execute(params![id.as_raw(), sample.time, sample.value])
                    .map_err(|err| sql_error("mmr_store.insert_phase", err))?;
            }
        }
        tx.commit().map_err(|err| sql_error("mmr_store.insert_phase", err))
    }

    fn read_all(&self, id: ResonanceId) -> Result<Vec<PhaseSample>, MmrError> {
        let mut stmt = self
            .conn
            .prepare("SELECT time, value FROM phases WHERE resonance_id = ? ORDER BY id")
            .map_err(|err| sql_error("mmr_store.read_phases", err))?;
        let rows = stmt
            .query_map(params![id.as_raw()], |row| {
                Ok(PhaseSample::new(row.get(0)?, row.get(1)?))
            })
            .map_err(|err| sql_error("mmr_store.read_phases", err))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|err| sql_error("mmr_store.read_phases", err))
    }

    fn clear(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        self.conn
            .execute("DELETE FROM phases WHERE resonance_id = ?", params![id.as_raw()])
            .map_err(|err| sql_error("mmr_store.clear_phases", err))?;
        Ok(())
    }
}

impl LibrationStore for SqliteStore {
    fn save_libration(&mut self, record: &LibrationRecord) -> Result<(), MmrError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO librations(resonance_id, convention, asteroid, kind, percentage, max_diff, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.resonance_id.as_raw(),
                    convention_ordinal(record.kind.convention()),
                    record.asteroid,
                    record.kind.as_str(),
                    record.percentage,
                    record.max_diff,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|err| sql_error("mmr_store.insert_libration", err))?;
        Ok(())
    }

    fn clear_librations(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        self.conn
            .execute(
                "DELETE FROM librations WHERE resonance_id = ?",
                params![id.as_raw()],
            )
            .map_err(|err| sql_error("mmr_store.clear_librations", err))?;
        Ok(())
    }

    fn librations(&self) -> Result<Vec<LibrationRecord>, MmrError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT asteroid, resonance_id, kind, percentage, max_diff FROM librations
                 ORDER BY resonance_id, convention",
            )
            .map_err(|err| sql_error("mmr_store.librations", err))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            })
            .map_err(|err| sql_error("mmr_store.librations", err))?;
        let mut records = Vec::new();
        for row in rows {
            let (asteroid, resonance_id, kind, percentage, max_diff) =
                row.map_err(|err| sql_error("mmr_store.librations", err))?;
            let kind = LibrationKind::parse(&kind).ok_or_else(|| {
                MmrError::Storage(
                    ErrorInfo::new("mmr_store.libration_kind", "unknown libration kind")
                        .with_context("kind", kind.clone()),
                )
            })?;
            records.push(LibrationRecord {
                asteroid,
                resonance_id: ResonanceId::from_raw(resonance_id),
                kind,
                percentage,
                max_diff,
            });
        }
        Ok(records)
    }
}
