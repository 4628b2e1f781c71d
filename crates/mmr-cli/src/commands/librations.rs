use std::error::Error;

use clap::Args;
use mmr_pipeline::PipelineConfig;
use mmr_store::libration_rows;

use super::open_storage;

#[derive(Args, Debug)]
pub struct LibrationsArgs {
    /// Only show this asteroid, e.g. `A1`.
    #[arg(long)]
    pub asteroid: Option<String>,
    /// Only show pure librations.
    #[arg(long)]
    pub pure: bool,
}

pub fn run(config: &PipelineConfig, args: &LibrationsArgs) -> Result<(), Box<dyn Error>> {
    let storage = open_storage(config)?;
    let rows = libration_rows(&storage)?;
    let mut shown = 0;
    for row in rows {
        if args.asteroid.as_deref().is_some_and(|name| name != row.asteroid) {
            continue;
        }
        if args.pure && !row.kind.is_pure() {
            continue;
        }
        println!(
            "{}\t{}\t{}\t{:.3}\t{:.3}",
            row.asteroid, row.resonance, row.kind, row.percentage, row.max_diff
        );
        shown += 1;
    }
    if shown == 0 {
        println!("no librations stored");
    }
    Ok(())
}
