use mmr_core::errors::MmrError;
use mmr_core::{
    Convention, LibrationRecord, LibrationStore, PhaseSample, PhaseStore, ResonanceId,
};
use tracing::{debug, info, warn};

use crate::circulation::find_circulation_breaks;
use crate::classifier::{classify, ClassifierSettings, Libration};

/// Runs detection and classification for both conventions.
#[derive(Debug, Clone, Default)]
pub struct LibrationFinder {
    settings: ClassifierSettings,
}

impl LibrationFinder {
    /// Creates a finder with the provided thresholds.
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    /// Classifies an in-memory series, pericentric first.
    pub fn classify_series(&self, samples: &[PhaseSample]) -> Result<Vec<Libration>, MmrError> {
        let mut librations = Vec::new();
        for convention in Convention::ALL {
            let breaks = find_circulation_breaks(samples, convention)?;
            if let Some(libration) = classify(&breaks, convention, &self.settings) {
                librations.push(libration);
            }
        }
        Ok(librations)
    }

    /// Classifies the stored phases of one resonance and replaces its records.
    ///
    /// Returns `None` when no phases are stored for the resonance.
    pub fn find<S: PhaseStore + LibrationStore + ?Sized>(
        &self,
        asteroid: &str,
        resonance_id: ResonanceId,
        store: &mut S,
    ) -> Result<Option<Vec<LibrationRecord>>, MmrError> {
        let samples = store.read_all(resonance_id)?;
        let librations = match self.classify_series(&samples) {
            Ok(librations) => librations,
            Err(err) if err.is_recoverable() => {
                warn!(%asteroid, resonance = %resonance_id, "skipping resonance: {err}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        store.clear_librations(resonance_id)?;
        if librations.is_empty() {
            debug!(%asteroid, resonance = %resonance_id, "no resonance");
        }
        let mut records = Vec::with_capacity(librations.len());
        for libration in librations {
            let record = LibrationRecord {
                asteroid: asteroid.to_string(),
                resonance_id,
                kind: libration.kind,
                percentage: libration.percentage,
                max_diff: libration.max_diff,
            };
            store.save_libration(&record)?;
            info!(
                %asteroid,
                resonance = %resonance_id,
                kind = %record.kind,
                percentage = record.percentage,
                max_diff = record.max_diff,
                "libration found"
            );
            records.push(record);
        }
        Ok(Some(records))
    }
}
