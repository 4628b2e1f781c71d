use std::collections::HashMap;

use mmr_core::{
    codes, cutoff_angle, LibrationKind, LibrationRecord, LibrationStore, MmrError, PhaseSample, PhaseStore,
    ResonanceId,
};
use mmr_libration::{ClassifierSettings, LibrationFinder};

#[derive(Default)]
struct MapStore {
    phases: HashMap<ResonanceId, Vec<PhaseSample>>,
    records: Vec<LibrationRecord>,
}

impl PhaseStore for MapStore {
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

impl LibrationStore for MapStore {
    fn save_libration(&mut self, record: &LibrationRecord) -> Result<(), MmrError> {
        self.records.retain(|existing| {
            existing.resonance_id != record.resonance_id
                || existing.kind.convention() != record.kind.convention()
        });
        self.records.push(record.clone());
        Ok(())
    }

    fn librations(&self) -> Result<Vec<LibrationRecord>, MmrError> {
        Ok(self.records.clone())
    }

    fn clear_librations(&mut self, id: ResonanceId) -> Result<(), MmrError> {
        self.records.retain(|existing| existing.resonance_id != id);
        Ok(())
    }
}

fn finder() -> LibrationFinder {
    LibrationFinder::new(ClassifierSettings {
        x_stop: 1_000.0,
        min_libration_span: 200.0,
    })
}

#[test]
fn librating_phase_is_pure_in_one_convention_only() {
    let id = ResonanceId::from_raw(7);
    let mut store = MapStore::default();
    let samples: Vec<PhaseSample> = (0..100)
        .map(|idx| PhaseSample::new(idx as f64 * 10.0, 0.5 * (idx as f64 / 5.0).sin()))
        .collect();
    store.append_all(id, &samples).expect("append");

    let records = finder()
        .find("A1", id, &mut store)
        .expect("find")
        .expect("phases present");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, LibrationKind::Pure);
    assert_eq!(records[0].percentage, 100.0);
    assert_eq!(store.librations().expect("records").len(), 1);
}

#[test]
fn missing_phases_are_skipped() {
    let mut store = MapStore::default();
    let outcome = finder()
        .find("A2", ResonanceId::from_raw(3), &mut store)
        .expect("recoverable");
    assert!(outcome.is_none());
    assert!(store.librations().expect("records").is_empty());
}

#[test]
fn reruns_overwrite_records() {
    let id = ResonanceId::from_raw(1);
    let mut store = MapStore::default();
    store
        .append_all(id, &[PhaseSample::new(0.0, 0.1), PhaseSample::new(10.0, 0.2)])
        .expect("append");
    let first = finder().find("A1", id, &mut store).expect("first run");
    assert_eq!(first.map(|records| records.len()), Some(2));
    finder().find("A1", id, &mut store).expect("second run");
    let kinds: Vec<LibrationKind> = store
        .librations()
        .expect("records")
        .iter()
        .map(|record| record.kind)
        .collect();
    assert_eq!(kinds, vec![LibrationKind::Pure, LibrationKind::ApocentricPure]);
}

#[test]
fn circulating_rerun_drops_earlier_records() {
    let id = ResonanceId::from_raw(4);
    let other = ResonanceId::from_raw(5);
    let mut store = MapStore::default();
    store
        .append_all(id, &[PhaseSample::new(0.0, 0.1), PhaseSample::new(10.0, 0.1)])
        .expect("append");
    store
        .append_all(other, &[PhaseSample::new(0.0, 0.1)])
        .expect("append other");
    finder().find("A1", id, &mut store).expect("librating run");
    finder().find("A1", other, &mut store).expect("other run");
    assert_eq!(store.librations().expect("records").len(), 4);

    store.clear(id).expect("clear phases");
    let circulating: Vec<PhaseSample> = (0..200)
        .map(|idx| PhaseSample::new(idx as f64, cutoff_angle(idx as f64 * 2.0)))
        .collect();
    store.append_all(id, &circulating).expect("append circulating");
    let records = finder().find("A1", id, &mut store).expect("circulating run");
    assert_eq!(records, Some(Vec::new()));

    let remaining = store.librations().expect("records");
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|record| record.resonance_id == other));
}

#[test]
fn no_phase_code_is_stable() {
    let err = mmr_libration::find_circulation_breaks(&[], mmr_core::Convention::Apocentric)
        .expect_err("empty");
    assert_eq!(err.code(), codes::NO_PHASE_DATA);
}
