#![deny(missing_docs)]
#![doc = "Configuration, resumable pipeline and external collaborators of the resonance finder."]

pub mod config;
pub mod dispatch;
pub mod integrator;
pub mod mapping;
pub mod render;
/// Canonical JSON and YAML helpers.
pub mod serde;
pub mod state;

pub use config::{load_config, stable_hash, PipelineConfig};
pub use dispatch::{AsteroidRange, Pipeline, PipelineReport};
pub use integrator::{CommandIntegrator, Integrator, TimeWindow};
pub use mapping::{discover_mappings, CandidateMapping};
pub use render::{plot_librations, GnuplotRenderer, Renderer};
pub use state::{BatchHandle, PipelineState, Stage, StateFile};
