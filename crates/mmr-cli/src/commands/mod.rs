pub mod export;
pub mod librations;
pub mod plot;
pub mod stages;

use clap::Args;
use mmr_core::MmrError;
use mmr_pipeline::{AsteroidRange, PipelineConfig};
use mmr_store::Storage;

/// Asteroid numbers `[start, stop)`.
#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// First asteroid number.
    #[arg(long, default_value_t = 1)]
    pub start: usize,
    /// Exclusive upper bound.
    #[arg(long)]
    pub stop: usize,
}

impl RangeArgs {
    pub fn range(&self) -> AsteroidRange {
        AsteroidRange::new(self.start, self.stop)
    }
}

pub fn open_storage(config: &PipelineConfig) -> Result<Storage, MmrError> {
    Storage::open(
        &config.storage.database,
        config.storage.phase_storage,
        &config.storage.phase_dir,
    )
}
