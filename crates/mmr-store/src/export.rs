use std::fs;
use std::path::Path;

use mmr_core::errors::{ErrorInfo, MmrError};
use mmr_core::{LibrationKind, LibrationStore, ResonanceId, ResonanceStore};
use serde::{Deserialize, Serialize};

/// Flat libration row joined with its resonance description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrationRow {
    /// Asteroid name.
    pub asteroid: String,
    /// Resonance id.
    pub resonance_id: ResonanceId,
    /// Resonance in table notation.
    pub resonance: String,
    /// Classification.
    pub kind: LibrationKind,
    /// Share of the span spent librating, in percent.
    pub percentage: f64,
    /// Longest interval between consecutive breaks, in years.
    pub max_diff: f64,
}

fn export_error(path: &Path, err: impl ToString) -> MmrError {
    MmrError::Serde(
        ErrorInfo::new("mmr_store.export", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

/// Joins every stored libration with its resonance.
pub fn libration_rows<S: ResonanceStore + LibrationStore + ?Sized>(
    store: &S,
) -> Result<Vec<LibrationRow>, MmrError> {
    store
        .librations()?
        .into_iter()
        .map(|record| {
            let resonance = store
                .resonance(record.resonance_id)?
                .map(|resonance| resonance.to_string())
                .unwrap_or_default();
            Ok(LibrationRow {
                asteroid: record.asteroid,
                resonance_id: record.resonance_id,
                resonance,
                kind: record.kind,
                percentage: record.percentage,
                max_diff: record.max_diff,
            })
        })
        .collect()
}

/// Writes the librations as pretty JSON.
pub fn export_json<S: ResonanceStore + LibrationStore + ?Sized>(
    store: &S,
    out_path: &Path,
) -> Result<(), MmrError> {
    let rows = libration_rows(store)?;
    let bytes = serde_json::to_vec_pretty(&rows).map_err(|err| export_error(out_path, err))?;
    fs::write(out_path, bytes).map_err(|err| export_error(out_path, err))
}

/// Writes the librations as CSV with a header row.
pub fn export_csv<S: ResonanceStore + LibrationStore + ?Sized>(
    store: &S,
    out_path: &Path,
) -> Result<(), MmrError> {
    let mut wtr = csv::Writer::from_path(out_path).map_err(|err| export_error(out_path, err))?;
    wtr.write_record([
        "asteroid",
        "resonance_id",
        "resonance",
        "kind",
        "percentage",
        "max_diff",
    ])
    .map_err(|err| export_error(out_path, err))?;
    for row in libration_rows(store)? {
        wtr.write_record([
            row.asteroid,
            row.resonance_id.to_string(),
            row.resonance,
            row.kind.to_string(),
            format!("{:.3}", row.percentage),
            format!("{:.3}", row.max_diff),
        ])
        .map_err(|err| export_error(out_path, err))?;
    }
    wtr.flush().map_err(|err| export_error(out_path, err))
}
