#![deny(missing_docs)]
#![doc = "Orbital element series, resonant phase computation and res-file output."]

pub mod aei;
pub mod phase;
/// Res file output for plotting.
pub mod resfile;

pub use aei::{load_aei, ElementSeries, OrbitalSample, DEFAULT_AEI_HEADER_LINES};
pub use phase::{check_element_counts, compute_phases};
pub use resfile::write_res_file;
