use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use mmr_pipeline::PipelineConfig;
use mmr_store::{export_csv, export_json};

use super::open_storage;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
    /// Destination file.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(config: &PipelineConfig, args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let storage = open_storage(config)?;
    match args.format {
        ExportFormat::Csv => export_csv(&storage, &args.out)?,
        ExportFormat::Json => export_json(&storage, &args.out)?,
    }
    println!("wrote {}", args.out.display());
    Ok(())
}
