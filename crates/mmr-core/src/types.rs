use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a resonance by the storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResonanceId(i64);

impl ResonanceId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResonanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One resonant phase value at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    /// Time in years.
    pub time: f64,
    /// Resonant phase in radians, within (−π, π].
    pub value: f64,
}

impl PhaseSample {
    /// Creates a sample.
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Centre of the libration test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Convention {
    /// Libration around zero.
    Pericentric,
    /// Libration around ±π, tested by shifting the phase by π.
    Apocentric,
}

impl Convention {
    /// Both conventions in evaluation order.
    pub const ALL: [Convention; 2] = [Convention::Pericentric, Convention::Apocentric];

    /// True for the apocentric convention.
    pub fn is_apocentric(self) -> bool {
        matches!(self, Convention::Apocentric)
    }
}

/// Classification of a resonance for a single convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LibrationKind {
    /// The phase never circulated before the cutoff epoch.
    Pure,
    /// Pure libration around ±π.
    ApocentricPure,
    /// The phase librated for part of the span.
    Transient,
    /// Transient libration around ±π.
    ApocentricTransient,
}

impl LibrationKind {
    /// Combines purity with the convention the breaks were computed under.
    pub fn new(pure: bool, convention: Convention) -> Self {
        match (pure, convention) {
            (true, Convention::Pericentric) => LibrationKind::Pure,
            (true, Convention::Apocentric) => LibrationKind::ApocentricPure,
            (false, Convention::Pericentric) => LibrationKind::Transient,
            (false, Convention::Apocentric) => LibrationKind::ApocentricTransient,
        }
    }

    /// Convention the kind belongs to.
    pub fn convention(self) -> Convention {
        match self {
            LibrationKind::Pure | LibrationKind::Transient => Convention::Pericentric,
            LibrationKind::ApocentricPure | LibrationKind::ApocentricTransient => {
                Convention::Apocentric
            }
        }
    }

    /// True for pure kinds.
    pub fn is_pure(self) -> bool {
        matches!(self, LibrationKind::Pure | LibrationKind::ApocentricPure)
    }

    /// Stable label used in storage and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            LibrationKind::Pure => "pure",
            LibrationKind::ApocentricPure => "apocentric-pure",
            LibrationKind::Transient => "transient",
            LibrationKind::ApocentricTransient => "apocentric-transient",
        }
    }

    /// Parses a label produced by [`LibrationKind::as_str`].
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "pure" => Some(LibrationKind::Pure),
            "apocentric-pure" => Some(LibrationKind::ApocentricPure),
            "transient" => Some(LibrationKind::Transient),
            "apocentric-transient" => Some(LibrationKind::ApocentricTransient),
            _ => None,
        }
    }
}

impl fmt::Display for LibrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal classification artefact for one asteroid, resonance and convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrationRecord {
    /// Asteroid name (`A<number>`).
    pub asteroid: String,
    /// Resonance the record belongs to.
    pub resonance_id: ResonanceId,
    /// Classification.
    pub kind: LibrationKind,
    /// Share of the span spent librating, in percent.
    pub percentage: f64,
    /// Longest interval between consecutive breaks, in years.
    pub max_diff: f64,
}
