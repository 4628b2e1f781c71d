use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use mmr_core::errors::{codes, ErrorInfo, MmrError};

use crate::aei::OrbitalSample;
use crate::phase::check_element_counts;

fn io_error(path: &Path, err: impl ToString) -> MmrError {
    MmrError::Serde(
        ErrorInfo::new("res-write", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

/// Writes one `time phase <asteroid> <planets...>` line per timestep.
///
/// Element counts are validated before phase counts.
pub fn write_res_file(
    path: &Path,
    phases: &[f64],
    asteroid: &[OrbitalSample],
    planets: &[&[OrbitalSample]],
) -> Result<(), MmrError> {
    let mut sets: Vec<&[OrbitalSample]> = planets.to_vec();
    sets.push(asteroid);
    let count = check_element_counts(&sets)?;
    if phases.len() != count {
        return Err(MmrError::Phase(
            ErrorInfo::new(
                codes::PHASE_COUNT_MISMATCH,
                format!(
                    "number of resonant phases {} is not equal {count}",
                    phases.len()
                ),
            )
            .with_context("phases", phases.len().to_string())
            .with_context("elements", count.to_string()),
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }
    let file = File::create(path).map_err(|err| io_error(path, err))?;
    let mut writer = BufWriter::new(file);
    for (idx, (phase, sample)) in phases.iter().zip(asteroid).enumerate() {
        let planet_columns: Vec<String> = planets
            .iter()
            .map(|series| series[idx].serialize_as_planet())
            .collect();
        writeln!(
            writer,
            "{:.6} {:.6} {} {}",
            sample.time,
            phase,
            sample.serialize_as_asteroid(),
            planet_columns.join(" ")
        )
        .map_err(|err| io_error(path, err))?;
    }
    writer.flush().map_err(|err| io_error(path, err))
}
