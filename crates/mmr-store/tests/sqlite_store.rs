use mmr_core::{
    LibrationKind, LibrationRecord, LibrationStore, PhaseSample, PhaseStore, Resonance,
    ResonanceId, ResonanceStore,
};
use mmr_store::{FilePhaseStore, MemoryStore, PhaseStorage, SqliteStore, Storage};

fn resonance(asteroid: &str, axis: f64) -> Resonance {
    let planets = vec!["JUPITER".to_string(), "SATURN".to_string()];
    Resonance::from_integers(&planets, &[4, -2, -1, 0, 0, -1], axis, asteroid).expect("resonance")
}

fn record(id: ResonanceId, kind: LibrationKind, percentage: f64) -> LibrationRecord {
    LibrationRecord {
        asteroid: "A1".into(),
        resonance_id: id,
        kind,
        percentage,
        max_diff: 0.0,
    }
}

#[test]
fn resonances_are_deduplicated_by_identity() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut store = SqliteStore::open(&dir.path().join("db").join("mmr.sqlite")).expect("open");
    let first = store.persist_resonance(&resonance("A1", 2.7651)).expect("first");
    let again = store.persist_resonance(&resonance("A1", 2.7651)).expect("again");
    let other = store.persist_resonance(&resonance("A2", 2.7651)).expect("other");
    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(
        store.resonance(first).expect("lookup"),
        Some(resonance("A1", 2.7651))
    );
    assert_eq!(store.resonances_for("A2").expect("by asteroid"), vec![other]);
    assert!(store
        .resonance(ResonanceId::from_raw(99))
        .expect("lookup")
        .is_none());
}

#[test]
fn schema_survives_reopen() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("mmr.sqlite");
    let id = {
        let mut store = SqliteStore::open(&path).expect("open");
        store.persist_resonance(&resonance("A1", 2.7651)).expect("persist")
    };
    let store = SqliteStore::open(&path).expect("reopen");
    assert!(store.resonance(id).expect("lookup").is_some());
}

#[test]
fn phases_keep_insertion_order_and_clear() {
    let mut store = SqliteStore::open_in_memory().expect("open");
    let id = store.persist_resonance(&resonance("A1", 2.7651)).expect("persist");
    let samples = [
        PhaseSample::new(0.0, 0.3),
        PhaseSample::new(1.0, -0.2),
        PhaseSample::new(2.0, 3.1),
    ];
    store.append_all(id, &samples).expect("append all");
    store.append(id, PhaseSample::new(3.0, 1.0)).expect("append");
    let stored = store.read_all(id).expect("read");
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[2], samples[2]);
    store.clear(id).expect("clear");
    assert!(store.read_all(id).expect("read").is_empty());
}

#[test]
fn librations_are_unique_per_convention() {
    let mut store = SqliteStore::open_in_memory().expect("open");
    let id = store.persist_resonance(&resonance("A1", 2.7651)).expect("persist");
    store
        .save_libration(&record(id, LibrationKind::ApocentricTransient, 40.0))
        .expect("save");
    store
        .save_libration(&record(id, LibrationKind::Transient, 30.0))
        .expect("save");
    store
        .save_libration(&record(id, LibrationKind::Pure, 100.0))
        .expect("overwrite");
    let kinds: Vec<LibrationKind> = store
        .librations()
        .expect("librations")
        .into_iter()
        .map(|r| r.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![LibrationKind::Pure, LibrationKind::ApocentricTransient]
    );
}

#[test]
fn file_phase_store_appends_lines() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut store = FilePhaseStore::open(dir.path().join("phases")).expect("open");
    let id = ResonanceId::from_raw(5);
    assert!(store.read_all(id).expect("read empty").is_empty());
    store.append(id, PhaseSample::new(0.0, 0.5)).expect("append");
    store
        .append_all(id, &[PhaseSample::new(1.0, 0.6), PhaseSample::new(2.0, 0.7)])
        .expect("append all");
    assert_eq!(store.read_all(id).expect("read").len(), 3);
    store.clear(id).expect("clear");
    store.clear(id).expect("clear twice");
    assert!(store.read_all(id).expect("read").is_empty());
}

#[test]
fn storage_routes_phases_to_backend() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut storage = Storage::open(
        &dir.path().join("mmr.sqlite"),
        PhaseStorage::File,
        &dir.path().join("phases"),
    )
    .expect("storage");
    let id = storage
        .persist_resonance(&resonance("A1", 2.7651))
        .expect("persist");
    storage
        .append_all(id, &[PhaseSample::new(0.0, 0.1)])
        .expect("append");
    assert!(dir.path().join("phases").join(format!("{id}.jsonl")).is_file());
    assert!(storage.database().read_all(id).expect("db phases").is_empty());
    assert_eq!(storage.read_all(id).expect("phases").len(), 1);
}

#[test]
fn memory_store_matches_sqlite_identity() {
    let mut memory = MemoryStore::new();
    let first = memory.persist_resonance(&resonance("A1", 2.7651)).expect("first");
    let again = memory.persist_resonance(&resonance("A1", 2.7651)).expect("again");
    assert_eq!(first, again);
    assert_eq!(memory.resonances_for("A1").expect("ids"), vec![first]);
}

fn assert_clear_spares_other_resonances<S: ResonanceStore + LibrationStore>(store: &mut S) {
    let first = store.persist_resonance(&resonance("A1", 2.7651)).expect("first");
    let second = store.persist_resonance(&resonance("A2", 2.7651)).expect("second");
    store
        .save_libration(&record(first, LibrationKind::Pure, 100.0))
        .expect("save");
    store
        .save_libration(&record(first, LibrationKind::ApocentricTransient, 35.0))
        .expect("save");
    store
        .save_libration(&record(second, LibrationKind::Transient, 25.0))
        .expect("save");
    store.clear_librations(first).expect("clear");
    let remaining = store.librations().expect("librations");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].resonance_id, second);
}

#[test]
fn clearing_librations_spares_other_resonances() {
    assert_clear_spares_other_resonances(&mut SqliteStore::open_in_memory().expect("open"));
    assert_clear_spares_other_resonances(&mut MemoryStore::new());
}
