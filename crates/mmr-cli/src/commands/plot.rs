use std::error::Error;

use clap::Args;
use mmr_pipeline::{plot_librations, GnuplotRenderer, PipelineConfig};

use super::{open_storage, RangeArgs};

#[derive(Args, Debug)]
pub struct PlotArgs {
    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run(config: &PipelineConfig, args: &PlotArgs) -> Result<(), Box<dyn Error>> {
    let storage = open_storage(config)?;
    let renderer = GnuplotRenderer::from_config(config);
    let images = plot_librations(config, args.range.range(), &storage, &renderer)?;
    println!("rendered {images} images into {}", config.output.images_dir.display());
    Ok(())
}
