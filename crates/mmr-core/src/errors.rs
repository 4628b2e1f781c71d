//! Structured error types shared across MMR crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine readable error codes.
pub mod codes {
    /// Catalog line without a properly delimited name or with bad numbers.
    pub const MALFORMED_CATALOG_ENTRY: &str = "malformed-catalog-entry";
    /// Resonance table row with too few columns or unparsable values.
    pub const MALFORMED_TABLE_ROW: &str = "malformed-table-row";
    /// Integrator output row that cannot be parsed.
    pub const MALFORMED_AEI_ROW: &str = "malformed-aei-row";
    /// Element sets of the participating bodies differ in length.
    pub const ELEMENT_COUNT_MISMATCH: &str = "element-count-mismatch";
    /// Resonant phase count differs from the element count.
    pub const PHASE_COUNT_MISMATCH: &str = "phase-count-mismatch";
    /// A required input artefact is absent.
    pub const MISSING_INPUT_FILE: &str = "missing-input-file";
    /// No phase samples were stored for a resonance.
    pub const NO_PHASE_DATA: &str = "no-phase-data";
    /// The external integrator exited unsuccessfully.
    pub const INTEGRATOR_FAILED: &str = "integrator-failed";
    /// The external renderer exited unsuccessfully.
    pub const RENDERER_FAILED: &str = "renderer-failed";
    /// The persisted pipeline state could not be decoded.
    pub const STATE_CORRUPT: &str = "state-corrupt";
    /// A configuration value is outside its valid domain.
    pub const INVALID_CONFIG: &str = "invalid-config";
    /// Planet series supplied do not match the bodies of the resonance.
    pub const BODY_COUNT_MISMATCH: &str = "body-count-mismatch";
    /// A pipeline stage was entered out of order.
    pub const STAGE_ORDER: &str = "stage-order";
    /// A mapping names a resonance id the store does not know.
    pub const UNKNOWN_RESONANCE: &str = "unknown-resonance";
}

/// Structured payload attached to every [`MmrError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, counts, line numbers).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the resonance finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MmrError {
    /// Catalog and resonance table errors.
    #[error("catalog error: {0}")]
    Catalog(ErrorInfo),
    /// Orbital element ingestion errors.
    #[error("elements error: {0}")]
    Elements(ErrorInfo),
    /// Resonant phase computation errors.
    #[error("phase error: {0}")]
    Phase(ErrorInfo),
    /// Circulation detection and classification errors.
    #[error("libration error: {0}")]
    Libration(ErrorInfo),
    /// Storage backend errors.
    #[error("storage error: {0}")]
    Storage(ErrorInfo),
    /// Pipeline orchestration and collaborator errors.
    #[error("pipeline error: {0}")]
    Pipeline(ErrorInfo),
    /// Serialization, configuration and filesystem errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl MmrError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MmrError::Catalog(info)
            | MmrError::Elements(info)
            | MmrError::Phase(info)
            | MmrError::Libration(info)
            | MmrError::Storage(info)
            | MmrError::Pipeline(info)
            | MmrError::Serde(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// True when the caller may log the error and continue with the next item.
    pub fn is_recoverable(&self) -> bool {
        self.code() == codes::NO_PHASE_DATA
    }

    /// Builds a missing input file error for the provided path.
    pub fn missing_file(path: &std::path::Path, what: &str) -> Self {
        MmrError::Serde(
            ErrorInfo::new(codes::MISSING_INPUT_FILE, format!("{what} not found"))
                .with_context("path", path.display().to_string()),
        )
    }

    /// Builds an element count mismatch error.
    pub fn element_count(first: usize, second: usize) -> Self {
        MmrError::Phase(
            ErrorInfo::new(
                codes::ELEMENT_COUNT_MISMATCH,
                format!("count of first body elements: {first} not equal second body: {second}"),
            )
            .with_context("first", first.to_string())
            .with_context("second", second.to_string()),
        )
    }
}
