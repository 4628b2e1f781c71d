//! Per-batch candidate mappings (`agres-<i>.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::ResonanceId;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::serde::{from_json_slice, to_canonical_json_bytes, write_atomic};
use crate::state::BatchHandle;

const PREFIX: &str = "agres-";

/// Asteroid name to candidate resonance ids of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateMapping {
    /// Batch index.
    pub batch: usize,
    /// First asteroid number of the batch.
    #[serde(default)]
    pub start: usize,
    /// Exclusive upper bound of the batch.
    #[serde(default)]
    pub stop: usize,
    /// Candidate ids keyed by asteroid name.
    pub resonances: BTreeMap<String, Vec<ResonanceId>>,
}

impl CandidateMapping {
    /// Number of candidate resonances across the batch.
    pub fn candidates(&self) -> usize {
        self.resonances.values().map(Vec::len).sum()
    }

    /// Writes the mapping atomically.
    pub fn write(&self, path: &Path) -> Result<(), MmrError> {
        write_atomic(path, &to_canonical_json_bytes(self)?)
    }

    /// Reads a mapping file.
    pub fn read(path: &Path) -> Result<Self, MmrError> {
        if !path.is_file() {
            return Err(MmrError::missing_file(path, "candidate mapping"));
        }
        let bytes = fs::read(path).map_err(|err| {
            MmrError::Pipeline(
                ErrorInfo::new("mapping-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_json_slice(&bytes)
    }

    /// Handle describing this mapping stored at `path`.
    pub fn handle(&self, path: PathBuf) -> BatchHandle {
        BatchHandle {
            index: self.batch,
            start: self.start,
            stop: self.stop,
            mapping: path,
        }
    }
}

/// Mapping file of batch `index`.
pub fn mapping_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{PREFIX}{index}.json"))
}

/// Empties the mapping directory, creating it when absent.
pub fn reset_mapping_dir(dir: &Path) -> Result<(), MmrError> {
    let io = |err: std::io::Error| {
        MmrError::Pipeline(
            ErrorInfo::new("mapping-dir", err.to_string())
                .with_context("path", dir.display().to_string()),
        )
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(io)?;
    }
    fs::create_dir_all(dir).map_err(io)
}

fn mapping_index(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix(PREFIX)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Finds mapping files in `dir`, ordered by batch index.
pub fn discover_mappings(dir: &Path) -> Result<Vec<BatchHandle>, MmrError> {
    let mut found: Vec<(usize, PathBuf)> = Vec::new();
    if dir.is_dir() {
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| {
                MmrError::Pipeline(
                    ErrorInfo::new("mapping-scan", err.to_string())
                        .with_context("path", dir.display().to_string()),
                )
            })?;
            if let Some(index) = mapping_index(entry.path()) {
                found.push((index, entry.into_path()));
            }
        }
    }
    if found.is_empty() {
        return Err(MmrError::Pipeline(
            ErrorInfo::new(codes::MISSING_INPUT_FILE, "no candidate mappings found")
                .with_context("path", dir.display().to_string())
                .with_hint("run the load-resonances stage first"),
        ));
    }
    found.sort_by_key(|(index, _)| *index);
    found
        .into_iter()
        .map(|(_, path)| CandidateMapping::read(&path).map(|mapping| mapping.handle(path)))
        .collect()
}
