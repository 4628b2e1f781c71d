//! Plot rendering of res files.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::{apocentric, LibrationStore, PhaseStore, ResonanceId, ResonanceStore};
use mmr_phase::{load_aei, write_res_file, OrbitalSample};
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::dispatch::AsteroidRange;

const SCRIPT_TEMPLATE: &str = "set terminal png size 1024,768
set multiplot layout 2,1 title \"{title}\"
set xrange [0:{x_stop}]
set yrange [-3.2:3.2]
set ylabel \"resonant phase\"
plot \"{res}\" using 1:2 with {style} notitle
set autoscale y
set ylabel \"semi-major axis\"
plot \"{res}\" using 1:3 with lines notitle
unset multiplot
";

/// Draws one res file into one image.
pub trait Renderer {
    /// Renders `res_path` into `image_path`.
    fn render(&self, res_path: &Path, image_path: &Path, title: &str) -> Result<(), MmrError>;
}

/// Writes a gnuplot script and pipes the executable's stdout into the image.
#[derive(Debug, Clone)]
pub struct GnuplotRenderer {
    command: String,
    style: String,
    x_stop: f64,
    script_dir: PathBuf,
}

impl GnuplotRenderer {
    /// Renderer described by the configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            command: config.renderer.command.clone(),
            style: config.renderer.plot_type.clone(),
            x_stop: config.libration.x_stop,
            script_dir: config.output.gnuplot_dir.clone(),
        }
    }

    /// Script contents for one res file.
    pub fn script(&self, res_path: &Path, title: &str) -> String {
        SCRIPT_TEMPLATE
            .replace("{title}", title)
            .replace("{x_stop}", &format!("{}", self.x_stop))
            .replace("{res}", &res_path.display().to_string())
            .replace("{style}", &self.style)
    }
}

fn render_io(path: &Path, err: impl ToString) -> MmrError {
    MmrError::Pipeline(
        ErrorInfo::new(codes::RENDERER_FAILED, err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

impl Renderer for GnuplotRenderer {
    fn render(&self, res_path: &Path, image_path: &Path, title: &str) -> Result<(), MmrError> {
        let stem = image_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plot".to_string());
        let script_path = self.script_dir.join(format!("{stem}.gnu"));
        fs::create_dir_all(&self.script_dir).map_err(|err| render_io(&self.script_dir, err))?;
        fs::write(&script_path, self.script(res_path, title))
            .map_err(|err| render_io(&script_path, err))?;
        if let Some(parent) = image_path.parent() {
            fs::create_dir_all(parent).map_err(|err| render_io(parent, err))?;
        }
        let image = File::create(image_path).map_err(|err| render_io(image_path, err))?;
        let status = Command::new(&self.command)
            .arg(&script_path)
            .stdout(Stdio::from(image))
            .status()
            .map_err(|err| render_io(&script_path, err))?;
        if !status.success() {
            return Err(MmrError::Pipeline(
                ErrorInfo::new(codes::RENDERER_FAILED, format!("renderer exited with {status}"))
                    .with_context("command", self.command.clone())
                    .with_context("script", script_path.display().to_string()),
            ));
        }
        Ok(())
    }
}

/// Parses the asteroid number out of an `A<number>` body name.
pub fn asteroid_number(name: &str) -> Option<usize> {
    name.strip_prefix('A')?.parse().ok()
}

/// Writes res files and images for every stored libration in `range`.
///
/// Both the pericentric and the apocentric phase are drawn. Returns the
/// number of images produced.
pub fn plot_librations<S, R>(
    config: &PipelineConfig,
    range: AsteroidRange,
    store: &S,
    renderer: &R,
) -> Result<usize, MmrError>
where
    S: ResonanceStore + PhaseStore + LibrationStore + ?Sized,
    R: Renderer + ?Sized,
{
    let header = config.integrator.aei_header_lines;
    let mut planets: Vec<Vec<OrbitalSample>> = Vec::with_capacity(config.planets.len());
    for planet in &config.planets {
        planets.push(load_aei(&config.aei_path(planet), header)?.samples);
    }
    let planet_refs: Vec<&[OrbitalSample]> = planets.iter().map(Vec::as_slice).collect();

    let mut seen: BTreeSet<ResonanceId> = BTreeSet::new();
    let mut images = 0;
    for record in store.librations()? {
        let in_range = asteroid_number(&record.asteroid).is_some_and(|n| range.contains(n));
        if !in_range || !seen.insert(record.resonance_id) {
            continue;
        }
        let phases: Vec<f64> = store
            .read_all(record.resonance_id)?
            .iter()
            .map(|sample| sample.value)
            .collect();
        if phases.is_empty() {
            continue;
        }
        let asteroid = load_aei(&config.aei_path(&record.asteroid), header)?;
        let title = store
            .resonance(record.resonance_id)?
            .map(|resonance| resonance.to_string())
            .unwrap_or_else(|| record.asteroid.clone());

        let apocentric_phases: Vec<f64> = phases.iter().map(|value| apocentric(*value)).collect();
        for (suffix, series) in [("", &phases), ("-apocentric", &apocentric_phases)] {
            let name = format!("{}-res{}{}", record.asteroid, record.resonance_id, suffix);
            let res_path = config.output.res_dir.join(format!("{name}.res"));
            if let Err(err) = write_res_file(&res_path, series, &asteroid.samples, &planet_refs) {
                error!(resonance = %record.resonance_id, "cannot write res file: {err}");
                continue;
            }
            let image_path = config.output.images_dir.join(format!("{name}.png"));
            renderer.render(&res_path, &image_path, &title)?;
            images += 1;
        }
    }
    info!(images, "plots rendered");
    Ok(images)
}
