//! YAML configuration of the resonance finder.

use std::fs;
use std::path::{Path, PathBuf};

use mmr_catalog::CoefficientFilter;
use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_libration::ClassifierSettings;
use mmr_phase::DEFAULT_AEI_HEADER_LINES;
use mmr_store::PhaseStorage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::serde::{from_yaml_slice, to_canonical_json_bytes};

fn invalid(key: &str, message: impl Into<String>) -> MmrError {
    MmrError::Serde(ErrorInfo::new(codes::INVALID_CONFIG, message).with_context("key", key))
}

/// Location and header size of the asteroid catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file.
    #[serde(default = "CatalogConfig::default_path")]
    pub path: PathBuf,
    /// Header lines preceding the first asteroid.
    #[serde(default = "CatalogConfig::default_skip_lines")]
    pub skip_lines: usize,
}

impl CatalogConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("axis/allnum.cat")
    }

    fn default_skip_lines() -> usize {
        6
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            skip_lines: Self::default_skip_lines(),
        }
    }
}

/// Resonance table location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table file.
    #[serde(default = "TableConfig::default_path")]
    pub path: PathBuf,
}

impl TableConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("axis/resonances")
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

/// External integrator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Executable run once per batch.
    #[serde(default = "IntegratorConfig::default_command")]
    pub command: String,
    /// Arguments placed before the manifest path.
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the integrator writes `<body>.aei` files into.
    #[serde(default = "IntegratorConfig::default_aei_dir")]
    pub aei_dir: PathBuf,
    /// Asteroids per batch.
    #[serde(default = "IntegratorConfig::default_batch_size")]
    pub batch_size: usize,
    /// Header lines of every aei file.
    #[serde(default = "IntegratorConfig::default_aei_header_lines")]
    pub aei_header_lines: usize,
    /// Start of the integration window (Julian day).
    #[serde(default = "IntegratorConfig::default_from_day")]
    pub from_day: f64,
    /// End of the integration window (Julian day).
    #[serde(default = "IntegratorConfig::default_to_day")]
    pub to_day: f64,
}

impl IntegratorConfig {
    fn default_command() -> String {
        "mercury6".to_string()
    }

    fn default_aei_dir() -> PathBuf {
        PathBuf::from("aei")
    }

    fn default_batch_size() -> usize {
        100
    }

    fn default_aei_header_lines() -> usize {
        DEFAULT_AEI_HEADER_LINES
    }

    fn default_from_day() -> f64 {
        2_451_000.5
    }

    fn default_to_day() -> f64 {
        2_501_000.5
    }
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            command: Self::default_command(),
            args: Vec::new(),
            aei_dir: Self::default_aei_dir(),
            batch_size: Self::default_batch_size(),
            aei_header_lines: Self::default_aei_header_lines(),
            from_day: Self::default_from_day(),
            to_day: Self::default_to_day(),
        }
    }
}

/// Classifier thresholds in years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrationConfig {
    /// Cutoff epoch.
    #[serde(default = "LibrationConfig::default_x_stop")]
    pub x_stop: f64,
    /// Shortest counted libration interval.
    #[serde(default = "LibrationConfig::default_min_libration_span")]
    pub min_libration_span: f64,
}

impl LibrationConfig {
    fn default_x_stop() -> f64 {
        ClassifierSettings::default().x_stop
    }

    fn default_min_libration_span() -> f64 {
        ClassifierSettings::default().min_libration_span
    }

    /// Classifier settings derived from the section.
    pub fn settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            x_stop: self.x_stop,
            min_libration_span: self.min_libration_span,
        }
    }
}

impl Default for LibrationConfig {
    fn default() -> Self {
        Self {
            x_stop: Self::default_x_stop(),
            min_libration_span: Self::default_min_libration_span(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file.
    #[serde(default = "StorageConfig::default_database")]
    pub database: PathBuf,
    /// Backend for phase samples.
    #[serde(default)]
    pub phase_storage: PhaseStorage,
    /// Directory of the file phase backend.
    #[serde(default = "StorageConfig::default_phase_dir")]
    pub phase_dir: PathBuf,
}

impl StorageConfig {
    fn default_database() -> PathBuf {
        PathBuf::from("export/resonances.sqlite")
    }

    fn default_phase_dir() -> PathBuf {
        PathBuf::from("export/phases")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: Self::default_database(),
            phase_storage: PhaseStorage::default(),
            phase_dir: Self::default_phase_dir(),
        }
    }
}

/// Output directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pipeline state and candidate mappings.
    #[serde(default = "OutputConfig::default_state_dir")]
    pub state_dir: PathBuf,
    /// Res files.
    #[serde(default = "OutputConfig::default_res_dir")]
    pub res_dir: PathBuf,
    /// Generated gnuplot scripts.
    #[serde(default = "OutputConfig::default_gnuplot_dir")]
    pub gnuplot_dir: PathBuf,
    /// Rendered images.
    #[serde(default = "OutputConfig::default_images_dir")]
    pub images_dir: PathBuf,
}

impl OutputConfig {
    fn default_state_dir() -> PathBuf {
        PathBuf::from("state")
    }

    fn default_res_dir() -> PathBuf {
        PathBuf::from("output/res")
    }

    fn default_gnuplot_dir() -> PathBuf {
        PathBuf::from("output/gnu")
    }

    fn default_images_dir() -> PathBuf {
        PathBuf::from("output/images")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            state_dir: Self::default_state_dir(),
            res_dir: Self::default_res_dir(),
            gnuplot_dir: Self::default_gnuplot_dir(),
            images_dir: Self::default_images_dir(),
        }
    }
}

/// Plot renderer invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Executable receiving the script path.
    #[serde(default = "RendererConfig::default_command")]
    pub command: String,
    /// Gnuplot drawing style of the phase series.
    #[serde(default = "RendererConfig::default_plot_type")]
    pub plot_type: String,
}

impl RendererConfig {
    fn default_command() -> String {
        "gnuplot".to_string()
    }

    fn default_plot_type() -> String {
        "points".to_string()
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: Self::default_command(),
            plot_type: Self::default_plot_type(),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Asteroid catalog.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Resonance table.
    #[serde(default)]
    pub resonance_table: TableConfig,
    /// Perturbing planets, one or two.
    #[serde(default = "PipelineConfig::default_planets")]
    pub planets: Vec<String>,
    /// Largest accepted distance between reference and asteroid axes.
    #[serde(default = "PipelineConfig::default_axis_swing")]
    pub axis_swing: f64,
    /// Longitude coefficient filters, one per body.
    #[serde(default)]
    pub integers: Vec<String>,
    /// Integrator.
    #[serde(default)]
    pub integrator: IntegratorConfig,
    /// Classifier thresholds.
    #[serde(default)]
    pub libration: LibrationConfig,
    /// Persistence.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Output directories.
    #[serde(default)]
    pub output: OutputConfig,
    /// Plot renderer.
    #[serde(default)]
    pub renderer: RendererConfig,
}

impl PipelineConfig {
    fn default_planets() -> Vec<String> {
        vec!["JUPITER".to_string(), "SATURN".to_string()]
    }

    fn default_axis_swing() -> f64 {
        0.01
    }

    /// Rejects values outside their domain.
    pub fn validate(&self) -> Result<(), MmrError> {
        if self.planets.is_empty() || self.planets.len() > 2 {
            return Err(invalid("planets", "one or two planets are required"));
        }
        if !(self.axis_swing >= 0.0) {
            return Err(invalid("axis_swing", "axis swing must be non-negative"));
        }
        if self.integrator.batch_size == 0 {
            return Err(invalid("integrator.batch_size", "batch size must be positive"));
        }
        if !(self.libration.x_stop > 0.0) {
            return Err(invalid("libration.x_stop", "x_stop must be positive"));
        }
        if self.integers.len() > self.planets.len() + 1 {
            return Err(invalid("integers", "more filters than bodies"));
        }
        self.coefficient_filter().map(|_| ())
    }

    /// Parsed longitude coefficient filter.
    pub fn coefficient_filter(&self) -> Result<CoefficientFilter, MmrError> {
        CoefficientFilter::parse(&self.integers)
    }

    /// State marker location.
    pub fn state_path(&self) -> PathBuf {
        self.output.state_dir.join("integration_state.json")
    }

    /// Candidate mapping directory.
    pub fn mapping_dir(&self) -> PathBuf {
        self.output.state_dir.join("agres")
    }

    /// Integrator output of a body.
    pub fn aei_path(&self, body: &str) -> PathBuf {
        self.integrator.aei_dir.join(format!("{body}.aei"))
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.catalog.path);
        resolve(&mut self.resonance_table.path);
        resolve(&mut self.integrator.aei_dir);
        resolve(&mut self.storage.database);
        resolve(&mut self.storage.phase_dir);
        resolve(&mut self.output.state_dir);
        resolve(&mut self.output.res_dir);
        resolve(&mut self.output.gnuplot_dir);
        resolve(&mut self.output.images_dir);
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            resonance_table: TableConfig::default(),
            planets: Self::default_planets(),
            axis_swing: Self::default_axis_swing(),
            integers: Vec::new(),
            integrator: IntegratorConfig::default(),
            libration: LibrationConfig::default(),
            storage: StorageConfig::default(),
            output: OutputConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

/// Loads a configuration, resolving relative paths against its directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, MmrError> {
    let config_path = path.as_ref();
    if !config_path.is_file() {
        return Err(MmrError::missing_file(config_path, "configuration"));
    }
    let bytes = fs::read(config_path).map_err(|err| {
        MmrError::Serde(
            ErrorInfo::new("config_read", err.to_string())
                .with_context("path", config_path.display().to_string()),
        )
    })?;
    let mut config: PipelineConfig = from_yaml_slice(&bytes)?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    config.validate()?;
    Ok(config)
}

/// Computes a stable SHA256 hash for the provided serializable value.
pub fn stable_hash<T: Serialize>(value: &T) -> Result<String, MmrError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
