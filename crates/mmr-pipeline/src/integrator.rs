//! Orbit integration collaborator.

use std::path::{Path, PathBuf};
use std::process::Command;

use mmr_catalog::{CatalogBatch, CatalogElements};
use mmr_core::errors::{codes, ErrorInfo, MmrError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::IntegratorConfig;
use crate::serde::{to_canonical_json_bytes, write_atomic};

/// Integration window in Julian days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start epoch.
    pub from_day: f64,
    /// End epoch.
    pub to_day: f64,
}

impl TimeWindow {
    /// Window configured for the integrator.
    pub fn from_config(config: &IntegratorConfig) -> Self {
        Self {
            from_day: config.from_day,
            to_day: config.to_day,
        }
    }
}

/// Produces one aei file per asteroid of a batch, plus the planets' files.
pub trait Integrator {
    /// Integrates the batch over `window`, writing into `aei_dir`.
    fn integrate(
        &self,
        batch: &CatalogBatch,
        window: &TimeWindow,
        aei_dir: &Path,
    ) -> Result<(), MmrError>;
}

#[derive(Debug, Serialize)]
struct ManifestAsteroid<'a> {
    name: String,
    number: usize,
    elements: &'a CatalogElements,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    batch: usize,
    from_day: f64,
    to_day: f64,
    aei_dir: &'a Path,
    asteroids: Vec<ManifestAsteroid<'a>>,
}

/// Runs an external executable as `<command> <args...> <manifest.json>`.
#[derive(Debug, Clone)]
pub struct CommandIntegrator {
    command: String,
    args: Vec<String>,
    manifest_dir: PathBuf,
}

impl CommandIntegrator {
    /// Integrator writing manifests into `manifest_dir`.
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        manifest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Integrator described by the configuration section.
    pub fn from_config(config: &IntegratorConfig, manifest_dir: impl Into<PathBuf>) -> Self {
        Self::new(config.command.clone(), config.args.clone(), manifest_dir)
    }

    fn failed(&self, message: impl Into<String>, batch: usize) -> ErrorInfo {
        ErrorInfo::new(codes::INTEGRATOR_FAILED, message)
            .with_context("command", self.command.clone())
            .with_context("batch", batch.to_string())
    }
}

impl Integrator for CommandIntegrator {
    fn integrate(
        &self,
        batch: &CatalogBatch,
        window: &TimeWindow,
        aei_dir: &Path,
    ) -> Result<(), MmrError> {
        let manifest = Manifest {
            batch: batch.index,
            from_day: window.from_day,
            to_day: window.to_day,
            aei_dir,
            asteroids: batch
                .entries
                .iter()
                .map(|entry| ManifestAsteroid {
                    name: entry.body_name(),
                    number: entry.number,
                    elements: &entry.elements,
                })
                .collect(),
        };
        let manifest_path = self
            .manifest_dir
            .join(format!("integrate-{}.json", batch.index));
        write_atomic(&manifest_path, &to_canonical_json_bytes(&manifest)?)?;
        std::fs::create_dir_all(aei_dir).map_err(|err| {
            MmrError::Pipeline(
                ErrorInfo::new("aei-dir", err.to_string())
                    .with_context("path", aei_dir.display().to_string()),
            )
        })?;

        debug!(command = %self.command, manifest = %manifest_path.display(), "starting integrator");
        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(&manifest_path)
            .status()
            .map_err(|err| MmrError::Pipeline(self.failed(err.to_string(), batch.index)))?;
        if !status.success() {
            let mut info = self.failed(format!("integrator exited with {status}"), batch.index);
            if let Some(code) = status.code() {
                info = info.with_context("exit_code", code.to_string());
            }
            return Err(MmrError::Pipeline(info));
        }
        info!(
            batch = batch.index,
            asteroids = batch.entries.len(),
            "batch integrated"
        );
        Ok(())
    }
}
