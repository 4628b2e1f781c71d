//! Integrator output (`.aei`) files.

use std::fs;
use std::path::Path;

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Header lines written by the integrator before the first sample.
pub const DEFAULT_AEI_HEADER_LINES: usize = 4;

const AEI_COLUMNS: usize = 9;

/// Orbital elements of one body at one epoch. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalSample {
    /// Time in years.
    pub time: f64,
    /// Longitude of perihelion.
    pub perihelion_longitude: f64,
    /// Mean anomaly.
    pub mean_anomaly: f64,
    /// Semi-major axis (AU).
    pub axis: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination.
    pub inclination: f64,
    /// Argument of perihelion.
    pub perihelion_argument: f64,
    /// Longitude of the ascending node.
    pub ascending_node: f64,
    /// Mass in integrator units.
    pub mass: f64,
}

impl OrbitalSample {
    /// Parses `time long M a e i peri node mass`, converting degrees to radians.
    pub fn parse_row(text: &str, line: usize) -> Result<Self, MmrError> {
        let malformed = |message: String| {
            MmrError::Elements(
                ErrorInfo::new(codes::MALFORMED_AEI_ROW, message)
                    .with_context("line", line.to_string()),
            )
        };
        let values = text
            .split_whitespace()
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|err| malformed(format!("bad value {field}: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() < AEI_COLUMNS {
            return Err(malformed(format!(
                "expected {AEI_COLUMNS} columns, found {}",
                values.len()
            )));
        }
        Ok(Self {
            time: values[0],
            perihelion_longitude: values[1].to_radians(),
            mean_anomaly: values[2].to_radians(),
            axis: values[3],
            eccentricity: values[4],
            inclination: values[5].to_radians(),
            perihelion_argument: values[6].to_radians(),
            ascending_node: values[7].to_radians(),
            mass: values[8],
        })
    }

    /// Mean longitude, not reduced into the principal range.
    pub fn mean_longitude(&self) -> f64 {
        self.perihelion_longitude + self.mean_anomaly
    }

    /// Res-file columns of the small body: `a e i peri node`.
    pub fn serialize_as_asteroid(&self) -> String {
        format!(
            "{:.6} {:.6} {:.6} {:.6} {:.6}",
            self.axis,
            self.eccentricity,
            self.inclination,
            self.perihelion_argument,
            self.ascending_node
        )
    }

    /// Res-file columns of a perturbing body: `a e`.
    pub fn serialize_as_planet(&self) -> String {
        format!("{:.6} {:.6}", self.axis, self.eccentricity)
    }
}

/// Samples of one body in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSeries {
    /// Body name, taken from the file stem.
    pub name: String,
    /// Samples ordered by time.
    pub samples: Vec<OrbitalSample>,
}

impl ElementSeries {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Loads an aei file, skipping `header_lines` leading lines and blank lines.
pub fn load_aei(path: &Path, header_lines: usize) -> Result<ElementSeries, MmrError> {
    if !path.is_file() {
        return Err(MmrError::missing_file(path, "aei file"));
    }
    let contents = fs::read_to_string(path).map_err(|err| {
        MmrError::Elements(
            ErrorInfo::new("aei-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let samples = contents
        .lines()
        .enumerate()
        .skip(header_lines)
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(idx, text)| {
            OrbitalSample::parse_row(text, idx + 1).map_err(|err| match err {
                MmrError::Elements(info) => MmrError::Elements(
                    info.with_context("path", path.display().to_string()),
                ),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(body = %name, samples = samples.len(), "loaded aei file");
    Ok(ElementSeries { name, samples })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "0.0000000 1.541309e+02 3.172742e+02 2.76503 0.077237 10.6047 73.6553 80.4757 0.000000e+00";

    #[test]
    fn parses_degrees_into_radians() {
        let sample = OrbitalSample::parse_row(ROW, 5).unwrap();
        assert!((sample.mean_longitude() - 8.227571105693121).abs() < 1e-12);
        assert_eq!(sample.axis, 2.76503);
        assert!((sample.inclination - 10.6047f64.to_radians()).abs() < 1e-15);
    }

    #[test]
    fn short_row_names_line() {
        let err = OrbitalSample::parse_row("0.0 1.0 2.0", 7).unwrap_err();
        assert_eq!(err.code(), codes::MALFORMED_AEI_ROW);
        assert_eq!(err.info().context.get("line").map(String::as_str), Some("7"));
    }
}
