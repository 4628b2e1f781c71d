use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use mmr_core::errors::{ErrorInfo, MmrError};
use mmr_core::{PhaseSample, PhaseStore, ResonanceId};

fn io_error(code: &str, path: &Path, err: impl ToString) -> MmrError {
    MmrError::Storage(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Phase store keeping one JSON-lines file per resonance.
#[derive(Debug, Clone)]
pub struct FilePhaseStore {
    dir: PathBuf,
}

impl FilePhaseStore {
    /// Uses `dir`, creating it when absent.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, MmrError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| io_error("mmr_store.phase_dir", &dir, err))?;
        Ok(Self { dir })
    }

    fn path(&self, id: ResonanceId) -> PathBuf {
        self.dir.join(format!("{id}.jsonl"))
    }
}

impl PhaseStore for FilePhaseStore {
    fn append(&mut self, id: ResonanceId, sample: PhaseSample) -> Result<(), MmrError> {
        self.append_all(id, &[sample])
    }

    fn append_all(&mut self, id: ResonanceId, samples: &[PhaseSample]) -> Result<(), MmrError> {
        let path = self.path(id);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| io_error("mmr_store.phase_write", &path, err))?;
        let mut writer = BufWriter::new(file);
        for sample in samples {
            serde_json::to_writer(&mut writer, sample)
                .map_err(|err| io_error("mmr_store.phase_write", &path, err))?;
            writer
                .write_all(b"\n")
                .map_err(|err| io_error("mmr_store.phase_write", &path, err))?;
        }
        writer
            .flush()
            .map_err(|err| io_error("mmr_store.phase_write", &path, err))
    }

    fn read_all(&self, id: ResonanceId) -> Result<Vec<PhaseSample>, MmrError> {
        let path = self.path(id);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error("mmr_store.phase_read", &path, err)),
        };
        let mut samples = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| io_error("mmr_store.phase_read", &path, err))?;
            if line.trim().is_empty() {
                continue;
            }
            samples.push(
                serde_json::from_str(&line)
                    .map_err(|err| io_error("mmr_store.phase_decode", &path, err))?,
            );
        }
        Ok(samples)
    }

    fn clear(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        let path = self.path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("mmr_store.phase_clear", &path, err)),
        }
    }
}
