mod support;

use std::fs;

use mmr_core::{codes, LibrationKind, LibrationStore};
use mmr_pipeline::{
    AsteroidRange, CandidateMapping, CommandIntegrator, Pipeline, PipelineReport, Stage,
    StateFile, TimeWindow,
};
use mmr_store::MemoryStore;
use support::{workspace, write_table, FakeIntegrator};

fn window() -> TimeWindow {
    TimeWindow {
        from_day: 2_451_000.5,
        to_day: 2_451_365.5,
    }
}

#[test]
fn fresh_run_executes_every_stage_and_removes_state() {
    let ws = workspace();
    let pipeline = Pipeline::new(&ws.config);
    let integrator = FakeIntegrator::new(12);
    let mut store = MemoryStore::new();

    let report = pipeline
        .run(AsteroidRange::new(1, 4), window(), &integrator, &mut store)
        .expect("run");

    assert_eq!(
        report.stages,
        vec![Stage::CalcDone, Stage::LoadDone, Stage::FindDone]
    );
    assert_eq!(*integrator.calls.borrow(), vec![0, 1]);
    assert_eq!(report.mapped_batches, 2);
    assert_eq!(report.candidates, 2);
    assert_eq!(report.checked, 2);
    assert!(!ws.config.state_path().exists());

    let first = CandidateMapping::read(&ws.config.mapping_dir().join("agres-0.json"))
        .expect("first mapping");
    assert_eq!(first.resonances.keys().collect::<Vec<_>>(), vec!["A1"]);
    let second = CandidateMapping::read(&ws.config.mapping_dir().join("agres-1.json"))
        .expect("second mapping");
    assert_eq!(second.resonances.keys().collect::<Vec<_>>(), vec!["A3"]);

    let records = store.librations().expect("librations");
    assert_eq!(report.librations, records.len());
    assert!(records
        .iter()
        .any(|record| record.asteroid == "A1" && record.kind == LibrationKind::Pure));
}

#[test]
fn calc_done_state_skips_integration() {
    let ws = workspace();
    fs::remove_file(&ws.config.resonance_table.path).expect("remove table");
    let pipeline = Pipeline::new(&ws.config);
    let integrator = FakeIntegrator::new(12);
    let mut store = MemoryStore::new();

    let err = pipeline
        .run(AsteroidRange::new(1, 4), window(), &integrator, &mut store)
        .expect_err("load fails without table");
    assert_eq!(err.code(), codes::MISSING_INPUT_FILE);
    let state = StateFile::new(ws.config.state_path())
        .load()
        .expect("state readable")
        .expect("state present");
    assert_eq!(state.stage, Stage::CalcDone);

    write_table(ws.path());
    let resumed = FakeIntegrator::new(12);
    let report = pipeline
        .run(AsteroidRange::new(1, 4), window(), &resumed, &mut store)
        .expect("resumed run");
    assert_eq!(resumed.call_count(), 0);
    assert_eq!(report.stages, vec![Stage::LoadDone, Stage::FindDone]);
    assert!(!ws.config.state_path().exists());
}

#[test]
fn changed_range_restarts_from_scratch() {
    let ws = workspace();
    fs::remove_file(&ws.config.resonance_table.path).expect("remove table");
    let pipeline = Pipeline::new(&ws.config);
    let mut store = MemoryStore::new();
    pipeline
        .run(AsteroidRange::new(1, 4), window(), &FakeIntegrator::new(12), &mut store)
        .expect_err("load fails without table");

    write_table(ws.path());
    let integrator = FakeIntegrator::new(12);
    let report = pipeline
        .run(AsteroidRange::new(1, 3), window(), &integrator, &mut store)
        .expect("restarted run");
    assert_eq!(integrator.call_count(), 1);
    assert_eq!(report.stages.first(), Some(&Stage::CalcDone));
}

#[test]
fn corrupt_state_is_ignored() {
    let ws = workspace();
    fs::create_dir_all(&ws.config.output.state_dir).expect("state dir");
    fs::write(ws.config.state_path(), b"{not json").expect("corrupt state");
    let pipeline = Pipeline::new(&ws.config);
    let integrator = FakeIntegrator::new(12);
    let report = pipeline
        .run(AsteroidRange::new(1, 4), window(), &integrator, &mut MemoryStore::new())
        .expect("run");
    assert_eq!(report.stages.len(), 3);
    assert_eq!(integrator.call_count(), 2);
}

#[test]
fn find_without_mappings_is_missing_input() {
    let ws = workspace();
    let pipeline = Pipeline::new(&ws.config);
    let mut report = PipelineReport::default();
    let err = pipeline
        .find(None, &mut MemoryStore::new(), &mut report)
        .expect_err("no mappings");
    assert_eq!(err.code(), codes::MISSING_INPUT_FILE);
}

#[test]
fn find_discovers_mappings_written_by_load() {
    let ws = workspace();
    let pipeline = Pipeline::new(&ws.config);
    let integrator = FakeIntegrator::new(12);
    let mut store = MemoryStore::new();
    pipeline
        .calc(AsteroidRange::new(1, 4), window(), &integrator)
        .expect("calc");
    pipeline
        .load(AsteroidRange::new(1, 4), &mut store)
        .expect("load");
    let mut report = PipelineReport::default();
    pipeline.find(None, &mut store, &mut report).expect("find");
    assert_eq!(report.checked, 2);
}

#[test]
fn mappings_from_another_store_name_unknown_resonances() {
    let ws = workspace();
    let pipeline = Pipeline::new(&ws.config);
    let integrator = FakeIntegrator::new(12);
    pipeline
        .calc(AsteroidRange::new(1, 4), window(), &integrator)
        .expect("calc");
    pipeline
        .load(AsteroidRange::new(1, 4), &mut MemoryStore::new())
        .expect("load");
    let mut report = PipelineReport::default();
    let err = pipeline
        .find(None, &mut MemoryStore::new(), &mut report)
        .expect_err("ids unknown to the fresh store");
    assert_eq!(err.code(), codes::UNKNOWN_RESONANCE);
    assert_eq!(err.info().context.get("asteroid").map(String::as_str), Some("A1"));
    assert_eq!(report.checked, 0);
}

#[cfg(unix)]
#[test]
fn failing_integrator_keeps_state_at_start() {
    let ws = workspace();
    let pipeline = Pipeline::new(&ws.config);
    let integrator = CommandIntegrator::new("false", Vec::new(), ws.path().join("manifests"));
    let err = pipeline
        .run(AsteroidRange::new(1, 4), window(), &integrator, &mut MemoryStore::new())
        .expect_err("integrator fails");
    assert_eq!(err.code(), codes::INTEGRATOR_FAILED);
    assert!(!ws.config.state_path().exists());
    assert!(ws.path().join("manifests").join("integrate-0.json").is_file());
}
