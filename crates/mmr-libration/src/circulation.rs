//! Detection of circulation breaks in a resonant phase series.

use std::f64::consts::PI;

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::{apocentric, Convention, PhaseSample};

/// Returns the epochs at which the phase circulated.
///
/// A break is a jump of at least π between consecutive samples and is dated
/// by the earlier sample. When a break runs opposite to the previous one the
/// previous break is retracted, so a phase that wraps back and forth across
/// ±π leaves a single break while repeated crossings in one sense each count.
pub fn find_circulation_breaks(
    samples: &[PhaseSample],
    convention: Convention,
) -> Result<Vec<f64>, MmrError> {
    if samples.is_empty() {
        return Err(MmrError::Libration(ErrorInfo::new(
            codes::NO_PHASE_DATA,
            "no resonant phases stored",
        )));
    }

    let mut breaks = Vec::new();
    let mut previous: Option<(f64, f64)> = None;
    let mut previous_direction = 0i8;

    for sample in samples {
        let value = if convention.is_apocentric() {
            apocentric(sample.value)
        } else {
            sample.value
        };
        if let Some((previous_year, previous_value)) = previous {
            if (previous_value - value).abs() >= PI {
                let direction = if previous_value > value { 1 } else { -1 };
                if previous_direction != 0 && direction != previous_direction {
                    breaks.pop();
                }
                breaks.push(previous_year);
                previous_direction = direction;
            }
        }
        previous = Some((sample.time, value));
    }

    Ok(breaks)
}
