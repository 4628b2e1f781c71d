#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use mmr_catalog::CatalogBatch;
use mmr_core::MmrError;
use mmr_pipeline::{Integrator, PipelineConfig, TimeWindow};

const AEI_HEADER: &str =
    "header\nheader\nheader\n    Time (years)     long        M        a        e        i      peri    node    mass\n";

pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub config: PipelineConfig,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn catalog_line(name: &str, axis: f64) -> String {
    format!("'{name}' 57800.0 {axis} 0.0757 10.5935 80.3056 72.5220 95.9891 3.34 0.12\n")
}

pub fn workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("tmp dir");
    let root = dir.path();
    let mut catalog = String::from("format = 'OEF2.0'\nEND_OF_HEADER\n");
    catalog.push_str(&catalog_line("1", 2.7650));
    catalog.push_str(&catalog_line("2", 3.1000));
    catalog.push_str(&catalog_line("3", 2.7652));
    fs::write(root.join("allnum.cat"), catalog).expect("catalog");
    write_table(root);

    let mut config = PipelineConfig::default();
    config.catalog.path = root.join("allnum.cat");
    config.catalog.skip_lines = 2;
    config.resonance_table.path = root.join("resonances");
    config.axis_swing = 0.001;
    config.integrator.aei_dir = root.join("aei");
    config.integrator.batch_size = 2;
    config.libration.x_stop = 100.0;
    config.libration.min_libration_span = 20.0;
    config.storage.database = root.join("mmr.sqlite");
    config.output.state_dir = root.join("state");
    config.output.res_dir = root.join("res");
    config.output.gnuplot_dir = root.join("gnu");
    config.output.images_dir = root.join("images");
    Workspace { dir, config }
}

pub fn write_table(root: &Path) {
    fs::write(root.join("resonances"), "4 -2 -1 0 0 -1 2.7651\n").expect("table");
}

pub fn write_aei(path: &Path, long: f64, mean_anomaly: f64, rows: usize) {
    let mut contents = String::from(AEI_HEADER);
    for idx in 0..rows {
        contents.push_str(&format!(
            "{:.7} {long:.6e} {mean_anomaly:.6e} 2.76503 0.077237 10.6047 73.6553 80.4757 0.000000e+00\n",
            idx as f64 * 10.0
        ));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("aei dir");
    }
    fs::write(path, contents).expect("aei");
}

/// Writes constant elements for the planets and every asteroid of the batch.
#[derive(Default)]
pub struct FakeIntegrator {
    pub calls: RefCell<Vec<usize>>,
    pub rows: usize,
}

impl FakeIntegrator {
    pub fn new(rows: usize) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            rows,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Integrator for FakeIntegrator {
    fn integrate(
        &self,
        batch: &CatalogBatch,
        _window: &TimeWindow,
        aei_dir: &Path,
    ) -> Result<(), MmrError> {
        self.calls.borrow_mut().push(batch.index);
        write_aei(&aei_dir.join("JUPITER.aei"), 14.0, 20.0, self.rows);
        write_aei(&aei_dir.join("SATURN.aei"), 92.0, 150.0, self.rows);
        for entry in &batch.entries {
            write_aei(
                &aei_dir.join(format!("{}.aei", entry.body_name())),
                154.1309,
                317.2742,
                self.rows,
            );
        }
        Ok(())
    }
}

pub fn state_path(config: &PipelineConfig) -> PathBuf {
    config.state_path()
}
