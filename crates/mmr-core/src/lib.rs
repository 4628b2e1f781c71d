#![deny(missing_docs)]
#![doc = "Core types, errors and storage capability traits for the mean-motion resonance finder."]

pub mod angle;
pub mod errors;
pub mod resonance;
mod types;

pub use angle::{apocentric, cutoff_angle};
pub use errors::{codes, ErrorInfo, MmrError};
pub use resonance::{AsteroidCoefficients, BodyCoefficients, BodyCount, Resonance};
pub use types::{Convention, LibrationKind, LibrationRecord, PhaseSample, ResonanceId};

/// Persists resonance definitions, deduplicating by identity.
pub trait ResonanceStore {
    /// Stores the resonance unless an identical one exists and returns its id.
    fn persist_resonance(&mut self, resonance: &Resonance) -> Result<ResonanceId, MmrError>;

    /// Looks a resonance up by id.
    fn resonance(&self, id: ResonanceId) -> Result<Option<Resonance>, MmrError>;

    /// Ids of every stored resonance of the asteroid, ascending.
    fn resonances_for(&self, asteroid: &str) -> Result<Vec<ResonanceId>, MmrError>;
}

/// Append-only storage of resonant phase samples keyed by resonance.
pub trait PhaseStore {
    /// Appends one sample to the series of the resonance.
    fn append(&mut self, id: ResonanceId, sample: PhaseSample) -> Result<(), MmrError>;

    /// Appends samples in order.
    fn append_all(&mut self, id: ResonanceId, samples: &[PhaseSample]) -> Result<(), MmrError> {
        for sample in samples {
            self.append(id, *sample)?;
        }
        Ok(())
    }

    /// Returns every stored sample of the resonance in insertion order.
    fn read_all(&self, id: ResonanceId) -> Result<Vec<PhaseSample>, MmrError>;

    /// Drops every stored sample of the resonance.
    fn clear(&mut self, id: ResonanceId) -> Result<(), MmrError>;
}

/// Storage of terminal libration records.
pub trait LibrationStore {
    /// Saves a record, replacing an earlier one for the same resonance and convention.
    fn save_libration(&mut self, record: &LibrationRecord) -> Result<(), MmrError>;

    /// Returns every stored record ordered by resonance id and kind.
    fn librations(&self) -> Result<Vec<LibrationRecord>, MmrError>;

    /// Drops every record of the resonance.
    fn clear_librations(&mut self, id: ResonanceId) -> Result<(), MmrError>;
}
