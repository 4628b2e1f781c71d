//! Resonant phase computation.

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::{cutoff_angle, BodyCoefficients, PhaseSample, Resonance};

use crate::aei::OrbitalSample;

/// Checks that consecutive element sets have equal lengths and returns it.
pub fn check_element_counts(sets: &[&[OrbitalSample]]) -> Result<usize, MmrError> {
    for pair in sets.windows(2) {
        if pair[0].len() != pair[1].len() {
            return Err(MmrError::element_count(pair[0].len(), pair[1].len()));
        }
    }
    Ok(sets.first().map_or(0, |set| set.len()))
}

fn term(coefficients: &BodyCoefficients, sample: &OrbitalSample) -> f64 {
    sample.mean_longitude() * f64::from(coefficients.longitude_coeff)
        + sample.perihelion_longitude * f64::from(coefficients.perihelion_coeff)
}

/// Computes the resonant phase for every timestep.
///
/// `planets` are aligned with [`Resonance::planets`]; every set, the
/// asteroid's included, must hold the same number of samples. Sample times
/// are taken from the asteroid.
pub fn compute_phases(
    resonance: &Resonance,
    planets: &[&[OrbitalSample]],
    asteroid: &[OrbitalSample],
) -> Result<Vec<PhaseSample>, MmrError> {
    let mut sets: Vec<&[OrbitalSample]> = planets.to_vec();
    sets.push(asteroid);
    check_element_counts(&sets)?;

    let coefficients = resonance.planets();
    if coefficients.len() != planets.len() {
        return Err(MmrError::Phase(
            ErrorInfo::new(codes::BODY_COUNT_MISMATCH, "planet series do not match the resonance")
                .with_context("resonance", coefficients.len().to_string())
                .with_context("series", planets.len().to_string()),
        ));
    }
    let small_body = &resonance.asteroid().body;

    Ok(asteroid
        .iter()
        .enumerate()
        .map(|(idx, sample)| {
            let value = coefficients
                .iter()
                .zip(planets)
                .map(|(body, series)| term(body, &series[idx]))
                .sum::<f64>()
                + term(small_body, sample);
            PhaseSample::new(sample.time, cutoff_angle(value))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, long: f64, mean_anomaly: f64) -> OrbitalSample {
        OrbitalSample {
            time,
            perihelion_longitude: long,
            mean_anomaly,
            axis: 2.0,
            eccentricity: 0.1,
            inclination: 0.0,
            perihelion_argument: 0.0,
            ascending_node: 0.0,
            mass: 0.0,
        }
    }

    #[test]
    fn count_mismatch_is_checked_before_computing() {
        let resonance = Resonance::from_integers(&["JUPITER".into()], &[1, -2, 0, 1], 2.5, "A1")
            .unwrap();
        let jupiter = vec![sample(0.0, 0.1, 0.2); 3];
        let asteroid = vec![sample(0.0, 0.3, 0.4); 2];
        let err = compute_phases(&resonance, &[&jupiter], &asteroid).unwrap_err();
        assert_eq!(err.code(), codes::ELEMENT_COUNT_MISMATCH);
        assert_eq!(err.info().context.get("first").map(String::as_str), Some("3"));
        assert_eq!(err.info().context.get("second").map(String::as_str), Some("2"));
    }

    #[test]
    fn planet_series_must_match_resonance_bodies() {
        let resonance = Resonance::from_integers(&["JUPITER".into()], &[1, -2, 0, 1], 2.5, "A1")
            .unwrap();
        let asteroid = vec![sample(0.0, 0.3, 0.4); 2];
        let err = compute_phases(&resonance, &[], &asteroid).unwrap_err();
        assert_eq!(err.code(), codes::BODY_COUNT_MISMATCH);
        assert_eq!(err.info().context.get("resonance").map(String::as_str), Some("1"));
        assert_eq!(err.info().context.get("series").map(String::as_str), Some("0"));
    }

    #[test]
    fn sums_weighted_longitudes() {
        let resonance = Resonance::from_integers(&["JUPITER".into()], &[1, -2, 0, 1], 2.5, "A1")
            .unwrap();
        let jupiter = vec![sample(0.0, 0.1, 0.2)];
        let asteroid = vec![sample(0.0, 0.3, 0.4)];
        let phases = compute_phases(&resonance, &[&jupiter], &asteroid).unwrap();
        let expected = 0.3 - 2.0 * 0.7 + 0.3;
        assert!((phases[0].value - expected).abs() < 1e-12);
    }
}
