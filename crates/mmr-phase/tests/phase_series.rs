use std::fs;
use std::path::Path;

use mmr_core::{codes, Resonance};
use mmr_phase::{compute_phases, load_aei, write_res_file, DEFAULT_AEI_HEADER_LINES};

const HEADER: &str = "           Jupiter   (Mercury6 aei file)\n Heliocentric elements\n\n    Time (years)     long        M        a        e        i      peri    node    mass\n";

fn write_aei(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(format!("{name}.aei"));
    let mut contents = HEADER.to_string();
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    fs::write(&path, contents).expect("write aei");
    path
}

const ASTEROID_ROWS: [&str; 2] = [
    "0.0000000 1.541309e+02 3.172742e+02 2.76503 0.077237 10.6047 73.6553 80.4757 0.000000e+00",
    "1.0000000 1.541310e+02 9.500000e+01 2.76504 0.077240 10.6046 73.6560 80.4750 0.000000e+00",
];

const PLANET_ROWS: [&str; 2] = [
    "0.0000000 1.400000e+01 2.000000e+01 5.20336 0.048393 1.3053 274.1977 100.4719 9.547922e-04",
    "1.0000000 1.400100e+01 5.040000e+01 5.20337 0.048390 1.3053 274.1980 100.4720 9.547922e-04",
];

fn jupiter_saturn_resonance() -> Resonance {
    let planets = vec!["JUPITER".to_string(), "SATURN".to_string()];
    Resonance::from_integers(&planets, &[4, -2, -1, 0, 0, -1], 2.7651, "A1").expect("resonance")
}

#[test]
fn loads_samples_after_header() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_aei(dir.path(), "A1", &ASTEROID_ROWS);
    let series = load_aei(&path, DEFAULT_AEI_HEADER_LINES).expect("load aei");
    assert_eq!(series.name, "A1");
    assert_eq!(series.len(), 2);
    assert!((series.samples[0].mean_longitude() - 8.227571105693121).abs() < 1e-12);
}

#[test]
fn malformed_row_reports_position() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_aei(dir.path(), "A2", &[ASTEROID_ROWS[0], "1.0 bad"]);
    let err = load_aei(&path, DEFAULT_AEI_HEADER_LINES).expect_err("bad row");
    assert_eq!(err.code(), codes::MALFORMED_AEI_ROW);
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("6"));

    let err = load_aei(&dir.path().join("A3.aei"), 4).expect_err("missing");
    assert_eq!(err.code(), codes::MISSING_INPUT_FILE);
}

#[test]
fn phases_follow_asteroid_times() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let asteroid = load_aei(&write_aei(dir.path(), "A1", &ASTEROID_ROWS), 4).expect("asteroid");
    let jupiter = load_aei(&write_aei(dir.path(), "JUPITER", &PLANET_ROWS), 4).expect("jupiter");
    let saturn = load_aei(&write_aei(dir.path(), "SATURN", &PLANET_ROWS), 4).expect("saturn");

    let phases = compute_phases(
        &jupiter_saturn_resonance(),
        &[&jupiter.samples, &saturn.samples],
        &asteroid.samples,
    )
    .expect("phases");
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[1].time, 1.0);
    for phase in &phases {
        assert!(phase.value > -std::f64::consts::PI && phase.value <= std::f64::consts::PI);
    }

    let j = &jupiter.samples[0];
    let s = &saturn.samples[0];
    let a = &asteroid.samples[0];
    let raw = 4.0 * j.mean_longitude() - 2.0 * s.mean_longitude() - a.mean_longitude()
        - a.perihelion_longitude;
    assert!((phases[0].value - mmr_core::cutoff_angle(raw)).abs() < 1e-12);
}

#[test]
fn res_file_checks_counts_and_formats_lines() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let asteroid = load_aei(&write_aei(dir.path(), "A1", &ASTEROID_ROWS), 4).expect("asteroid");
    let jupiter = load_aei(&write_aei(dir.path(), "JUPITER", &PLANET_ROWS), 4).expect("jupiter");
    let res_path = dir.path().join("res").join("A1_JUPITER.res");

    let err = write_res_file(&res_path, &[0.5], &asteroid.samples, &[&jupiter.samples])
        .expect_err("phase count");
    assert_eq!(err.code(), codes::PHASE_COUNT_MISMATCH);

    let err = write_res_file(&res_path, &[0.5], &asteroid.samples[..1], &[&jupiter.samples])
        .expect_err("element count first");
    assert_eq!(err.code(), codes::ELEMENT_COUNT_MISMATCH);

    write_res_file(&res_path, &[0.5, -0.25], &asteroid.samples, &[&jupiter.samples])
        .expect("write res");
    let contents = fs::read_to_string(&res_path).expect("read res");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0.000000 0.500000 2.765030 0.077237 "));
    assert!(lines[1].ends_with("5.203370 0.048390"));
}
