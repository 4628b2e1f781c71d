use std::error::Error;

use clap::Args;
use mmr_pipeline::{CommandIntegrator, Pipeline, PipelineConfig, PipelineReport, TimeWindow};
use tracing::info;

use super::{open_storage, RangeArgs};

/// Integration window overrides in Julian days.
#[derive(Args, Debug, Clone, Copy)]
pub struct WindowArgs {
    /// Start of the integration window.
    #[arg(long)]
    pub from_day: Option<f64>,
    /// End of the integration window.
    #[arg(long)]
    pub to_day: Option<f64>,
}

impl WindowArgs {
    fn window(&self, config: &PipelineConfig) -> TimeWindow {
        let configured = TimeWindow::from_config(&config.integrator);
        TimeWindow {
            from_day: self.from_day.unwrap_or(configured.from_day),
            to_day: self.to_day.unwrap_or(configured.to_day),
        }
    }
}

#[derive(Args, Debug)]
pub struct IntegrateArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Args, Debug)]
pub struct ClearPhasesArgs {
    #[command(flatten)]
    pub range: RangeArgs,
}

fn integrator(config: &PipelineConfig) -> CommandIntegrator {
    CommandIntegrator::from_config(&config.integrator, config.output.state_dir.join("manifests"))
}

fn print_report(report: &PipelineReport) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn integrate(config: &PipelineConfig, args: &IntegrateArgs) -> Result<(), Box<dyn Error>> {
    let mut storage = open_storage(config)?;
    let report = Pipeline::new(config).run(
        args.range.range(),
        args.window.window(config),
        &integrator(config),
        &mut storage,
    )?;
    print_report(&report)
}

pub fn calc(config: &PipelineConfig, args: &CalcArgs) -> Result<(), Box<dyn Error>> {
    let batches = Pipeline::new(config).calc(
        args.range.range(),
        args.window.window(config),
        &integrator(config),
    )?;
    println!("integrated {batches} batches");
    Ok(())
}

pub fn load(config: &PipelineConfig, args: &LoadArgs) -> Result<(), Box<dyn Error>> {
    let mut storage = open_storage(config)?;
    let (handles, candidates) = Pipeline::new(config).load(args.range.range(), &mut storage)?;
    info!(batches = handles.len(), candidates, "candidate mappings written");
    println!("{candidates} candidates in {} batches", handles.len());
    Ok(())
}

pub fn find(config: &PipelineConfig) -> Result<(), Box<dyn Error>> {
    let mut storage = open_storage(config)?;
    let mut report = PipelineReport::default();
    Pipeline::new(config).find(None, &mut storage, &mut report)?;
    print_report(&report)
}

pub fn clear_phases(
    config: &PipelineConfig,
    args: &ClearPhasesArgs,
) -> Result<(), Box<dyn Error>> {
    let mut storage = open_storage(config)?;
    let cleared = Pipeline::new(config).clear_phases(args.range.range(), &mut storage)?;
    println!("cleared phases of {cleared} resonances");
    Ok(())
}
