use std::collections::{BTreeMap, HashMap};

use mmr_core::errors::MmrError;
use mmr_core::{
    Convention, LibrationRecord, LibrationStore, PhaseSample, PhaseStore, Resonance, ResonanceId,
    ResonanceStore,
};

/// Process-local store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    resonances: Vec<Resonance>,
    identities: HashMap<String, ResonanceId>,
    phases: HashMap<ResonanceId, Vec<PhaseSample>>,
    librations: BTreeMap<(ResonanceId, bool), LibrationRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResonanceStore for MemoryStore {
    fn persist_resonance(&mut self, resonance: &Resonance) -> Result<ResonanceId, MmrError> {
        let identity = resonance.to_string();
        if let Some(id) = self.identities.get(&identity) {
            return Ok(*id);
        }
        self.resonances.push(resonance.clone());
        let id = ResonanceId::from_raw(self.resonances.len() as i64);
        self.identities.insert(identity, id);
        Ok(id)
    }

    fn resonance(&self, id: ResonanceId) -> Result<Option<Resonance>, MmrError> {
        let index = usize::try_from(id.as_raw() - 1).ok();
        Ok(index.and_then(|idx| self.resonances.get(idx)).cloned())
    }

    fn resonances_for(&self, asteroid: &str) -> Result<Vec<ResonanceId>, MmrError> {
        Ok(self
            .resonances
            .iter()
            .enumerate()
            .filter(|(_, resonance)| resonance.asteroid_name() == asteroid)
            .map(|(idx, _)| ResonanceId::from_raw(idx as i64 + 1))
            .collect())
    }
}

impl PhaseStore for MemoryStore {
    fn append(&mut self, id: ResonanceId, sample: PhaseSample) -> Result<(), MmrError> {
        self.phases.entry(id).or_default().push(sample);
        Ok(())
    }

    fn read_all(&self, id: ResonanceId) -> Result<Vec<PhaseSample>, MmrError> {
        Ok(self.phases.get(&id).cloned().unwrap_or_default())
    }

    fn clear(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        self.phases.remove(&id);
        Ok(())
    }
}

impl LibrationStore for MemoryStore {
    fn save_libration(&mut self, record: &LibrationRecord) -> Result<(), MmrError> {
        let apocentric = record.kind.convention() == Convention::Apocentric;
        self.librations
            .insert((record.resonance_id, apocentric), record.clone());
        Ok(())
    }

    fn librations(&self) -> Result<Vec<LibrationRecord>, MmrError> {
        Ok(self.librations.values().cloned().collect())
    }

    fn clear_librations(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        self.librations.retain(|(resonance_id, _), _| *resonance_id != id);
        Ok(())
    }
}
