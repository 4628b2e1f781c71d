use std::path::Path;

use mmr_core::errors::MmrError;
use mmr_core::{
    LibrationRecord, LibrationStore, PhaseSample, PhaseStore, Resonance, ResonanceId,
    ResonanceStore,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::file::FilePhaseStore;
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;

/// Backend used for phase samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStorage {
    /// Phases live in the resonance database.
    #[default]
    Sqlite,
    /// One JSON-lines file per resonance.
    File,
    /// Phases are kept in memory for the duration of the run.
    Memory,
}

enum PhaseBackend {
    Sqlite,
    File(FilePhaseStore),
    Memory(MemoryStore),
}

/// Storage handle opened once per run: the resonance database plus the
/// configured phase backend.
pub struct Storage {
    database: SqliteStore,
    phases: PhaseBackend,
}

impl Storage {
    /// Opens the database and the phase backend.
    pub fn open(
        database: &Path,
        phase_storage: PhaseStorage,
        phase_dir: &Path,
    ) -> Result<Self, MmrError> {
        let database = SqliteStore::open(database)?;
        Self::with_database(database, phase_storage, phase_dir)
    }

    /// Wraps an existing database handle.
    pub fn with_database(
        database: SqliteStore,
        phase_storage: PhaseStorage,
        phase_dir: &Path,
    ) -> Result<Self, MmrError> {
        let phases = match phase_storage {
            PhaseStorage::Sqlite => PhaseBackend::Sqlite,
            PhaseStorage::File => PhaseBackend::File(FilePhaseStore::open(phase_dir)?),
            PhaseStorage::Memory => PhaseBackend::Memory(MemoryStore::new()),
        };
        debug!(?phase_storage, "storage opened");
        Ok(Self { database, phases })
    }

    /// Resonance database.
    pub fn database(&self) -> &SqliteStore {
        &self.database
    }
}

impl ResonanceStore for Storage {
    fn persist_resonance(&mut self, resonance: &Resonance) -> Result<ResonanceId, MmrError> {
        self.database.persist_resonance(resonance)
    }

    fn resonance(&self, id: ResonanceId) -> Result<Option<Resonance>, MmrError> {
        self.database.resonance(id)
    }

    fn resonances_for(&self, asteroid: &str) -> Result<Vec<ResonanceId>, MmrError> {
        self.database.resonances_for(asteroid)
    }
}

impl PhaseStore for Storage {
    fn append(&mut self, id: ResonanceId, sample: PhaseSample) -> Result<(), MmrError> {
        match &mut self.phases {
            PhaseBackend::Sqlite => self.database.append(id, sample),
            PhaseBackend::File(store) => store.append(id, sample),
            PhaseBackend::Memory(store) => store.append(id, sample),
        }
    }

    fn append_all(&mut self, id: ResonanceId, samples: &[PhaseSample]) -> Result<(), MmrError> {
        match &mut self.phases {
            PhaseBackend::Sqlite => self.database.append_all(id, samples),
            PhaseBackend::File(store) => store.append_all(id, samples),
            PhaseBackend::Memory(store) => store.append_all(id, samples),
        }
    }

    fn read_all(&self, id: ResonanceId) -> Result<Vec<PhaseSample>, MmrError> {
        match &self.phases {
            PhaseBackend::Sqlite => self.database.read_all(id),
            PhaseBackend::File(store) => store.read_all(id),
            PhaseBackend::Memory(store) => store.read_all(id),
        }
    }

    fn clear(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        match &mut self.phases {
            PhaseBackend::Sqlite => self.database.clear(id),
            PhaseBackend::File(store) => store.clear(id),
            PhaseBackend::Memory(store) => store.clear(id),
        }
    }
}

impl LibrationStore for Storage {
    fn save_libration(&mut self, record: &LibrationRecord) -> Result<(), MmrError> {
        self.database.save_libration(record)
    }

    fn librations(&self) -> Result<Vec<LibrationRecord>, MmrError> {
        self.database.librations()
    }

    fn clear_librations(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        self.database.clear_librations(id)
    }
}
