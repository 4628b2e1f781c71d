use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use commands::{
    export::{self, ExportArgs},
    librations::{self, LibrationsArgs},
    plot::{self, PlotArgs},
    stages::{self, CalcArgs, ClearPhasesArgs, IntegrateArgs, LoadArgs},
};
use mmr_pipeline::load_config;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "mmr", about = "Mean-motion resonance finder")]
struct Cli {
    /// YAML configuration; relative paths inside it resolve against its directory.
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    loglevel: String,
    /// Append log output to this file instead of stderr.
    #[arg(long, global = true)]
    logfile: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run calc, load and find for a range, resuming an interrupted run.
    Integrate(IntegrateArgs),
    /// Integrate the orbits of a range only.
    Calc(CalcArgs),
    /// Build resonance candidates for a range from existing aei files.
    LoadResonances(LoadArgs),
    /// Search librations for every candidate mapping on disk.
    Find,
    /// Render res files and images of stored librations.
    Plot(PlotArgs),
    /// Print stored librations.
    Librations(LibrationsArgs),
    /// Write stored librations as CSV or JSON.
    Export(ExportArgs),
    /// Drop stored phases of a range.
    ClearPhases(ClearPhasesArgs),
}

fn init_logging(level: &str, logfile: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logfile {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.loglevel, cli.logfile.as_deref())?;
    run(cli).inspect_err(|err| error!("{err}"))
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::Integrate(args) => stages::integrate(&config, &args),
        Command::Calc(args) => stages::calc(&config, &args),
        Command::LoadResonances(args) => stages::load(&config, &args),
        Command::Find => stages::find(&config),
        Command::Plot(args) => plot::run(&config, &args),
        Command::Librations(args) => librations::run(&config, &args),
        Command::Export(args) => export::run(&config, &args),
        Command::ClearPhases(args) => stages::clear_phases(&config, &args),
    }
}
