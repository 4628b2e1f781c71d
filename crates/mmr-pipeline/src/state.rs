//! Persisted progress of the integration pipeline.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use mmr_core::errors::{codes, ErrorInfo, MmrError};
use serde::{Deserialize, Serialize};

use crate::serde::write_atomic;

/// Last completed stage. Stages only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Nothing done yet.
    Start,
    /// Orbits integrated for every batch.
    CalcDone,
    /// Candidate mappings written for every batch.
    LoadDone,
    /// Librations searched for every mapping.
    FindDone,
}

impl Stage {
    /// Stage following this one.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::CalcDone),
            Stage::CalcDone => Some(Stage::LoadDone),
            Stage::LoadDone => Some(Stage::FindDone),
            Stage::FindDone => None,
        }
    }
}

/// Asteroid number range handled by one candidate mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHandle {
    /// Zero based batch index.
    pub index: usize,
    /// First asteroid number.
    pub start: usize,
    /// Exclusive upper bound.
    pub stop: usize,
    /// Candidate mapping file of the batch.
    pub mapping: PathBuf,
}

/// Serializable pipeline progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    /// Last completed stage.
    pub stage: Stage,
    /// Handles recorded by the load stage.
    #[serde(default)]
    pub batches: Vec<BatchHandle>,
    /// Hash of the run parameters the state belongs to.
    pub config_hash: String,
    /// RFC 3339 time of the last transition.
    pub updated_at: String,
}

impl PipelineState {
    /// Fresh state for the given run parameters.
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            stage: Stage::Start,
            batches: Vec::new(),
            config_hash: config_hash.into(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Moves to `stage`, refusing to go backwards.
    pub fn advance(&mut self, stage: Stage) -> Result<(), MmrError> {
        if self.stage.next() != Some(stage) {
            return Err(MmrError::Pipeline(
                ErrorInfo::new(codes::STAGE_ORDER, "pipeline stages advance one at a time")
                    .with_context("from", format!("{:?}", self.stage))
                    .with_context("to", format!("{stage:?}")),
            ));
        }
        self.stage = stage;
        self.updated_at = Utc::now().to_rfc3339();
        Ok(())
    }
}

/// State marker on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Marker at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the marker. An absent marker yields `None`, an undecodable one
    /// a `state-corrupt` error.
    pub fn load(&self) -> Result<Option<PipelineState>, MmrError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(MmrError::Pipeline(
                    ErrorInfo::new("state-read", err.to_string())
                        .with_context("path", self.path.display().to_string()),
                ))
            }
        };
        serde_json::from_slice(&contents).map(Some).map_err(|err| {
            MmrError::Pipeline(
                ErrorInfo::new(codes::STATE_CORRUPT, err.to_string())
                    .with_context("path", self.path.display().to_string())
                    .with_hint("delete the state file to restart the pipeline"),
            )
        })
    }

    /// Replaces the marker atomically.
    pub fn store(&self, state: &PipelineState) -> Result<(), MmrError> {
        let json = serde_json::to_vec_pretty(state).map_err(|err| {
            MmrError::Pipeline(
                ErrorInfo::new("state-serialize", err.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        write_atomic(&self.path, &json)
    }

    /// Removes the marker if present.
    pub fn clear(&self) -> Result<(), MmrError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MmrError::Pipeline(
                ErrorInfo::new("state-clear", err.to_string())
                    .with_context("path", self.path.display().to_string()),
            )),
        }
    }
}
