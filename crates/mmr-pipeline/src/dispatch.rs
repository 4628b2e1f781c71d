//! Resumable calc → load → find pipeline.

use mmr_catalog::{
    load_resonances, load_table, CandidateBuilder, CatalogReader, CoefficientFilter, TableRow,
};
use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::{LibrationStore, PhaseStore, ResonanceId, ResonanceStore};
use mmr_libration::LibrationFinder;
use mmr_phase::{compute_phases, load_aei, ElementSeries, OrbitalSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{stable_hash, PipelineConfig};
use crate::integrator::{Integrator, TimeWindow};
use crate::mapping::{discover_mappings, mapping_path, reset_mapping_dir, CandidateMapping};
use crate::state::{BatchHandle, PipelineState, Stage, StateFile};

/// Asteroid numbers `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidRange {
    /// First asteroid number.
    pub start: usize,
    /// Exclusive upper bound.
    pub stop: usize,
}

impl AsteroidRange {
    /// Range of asteroid numbers.
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// True when `number` falls inside the range.
    pub fn contains(&self, number: usize) -> bool {
        number >= self.start && number < self.stop
    }
}

/// Summary of a pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Stages executed in this invocation, in order.
    pub stages: Vec<Stage>,
    /// Batches integrated.
    pub integrated_batches: usize,
    /// Batches with a written candidate mapping.
    pub mapped_batches: usize,
    /// Candidate resonances written to mappings.
    pub candidates: usize,
    /// Resonances whose phases were computed and classified.
    pub checked: usize,
    /// Libration records saved.
    pub librations: usize,
    /// Resonances skipped because no phases were available.
    pub skipped: usize,
}

struct FindContext {
    planets: Vec<ElementSeries>,
    filter: CoefficientFilter,
    finder: LibrationFinder,
}

#[derive(Serialize)]
struct RunKey<'a> {
    config: &'a PipelineConfig,
    range: AsteroidRange,
    window: TimeWindow,
}

/// Drives the three stages against the configured collaborators.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    state_file: StateFile,
}

impl<'a> Pipeline<'a> {
    /// Pipeline persisting its state under the configured state directory.
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            state_file: StateFile::new(config.state_path()),
        }
    }

    fn catalog(&self) -> Result<CatalogReader, MmrError> {
        CatalogReader::open(&self.config.catalog.path, self.config.catalog.skip_lines)
    }

    fn builder(&self) -> Result<CandidateBuilder, MmrError> {
        CandidateBuilder::new(self.config.planets.clone(), self.config.axis_swing)
    }

    fn table(&self, builder: &CandidateBuilder) -> Result<Vec<TableRow>, MmrError> {
        load_table(&self.config.resonance_table.path, builder.body_count())
    }

    fn resume_state(&self, config_hash: &str) -> Result<PipelineState, MmrError> {
        match self.state_file.load() {
            Ok(Some(state)) if state.config_hash == config_hash => {
                info!(stage = ?state.stage, "resuming pipeline");
                Ok(state)
            }
            Ok(Some(state)) => {
                warn!(
                    stage = ?state.stage,
                    "pipeline state belongs to different parameters, restarting"
                );
                Ok(PipelineState::new(config_hash))
            }
            Ok(None) => Ok(PipelineState::new(config_hash)),
            Err(err) if err.code() == codes::STATE_CORRUPT => {
                warn!("ignoring unreadable pipeline state: {err}");
                Ok(PipelineState::new(config_hash))
            }
            Err(err) => Err(err),
        }
    }

    fn advance(&self, state: &mut PipelineState, stage: Stage) -> Result<(), MmrError> {
        state.advance(stage)?;
        self.state_file.store(state)?;
        debug!(?stage, "pipeline state saved");
        Ok(())
    }

    /// Runs every stage not yet completed for these parameters.
    ///
    /// The state is saved after each stage and removed once the last one
    /// succeeds, so the next invocation starts from scratch.
    pub fn run<I, S>(
        &self,
        range: AsteroidRange,
        window: TimeWindow,
        integrator: &I,
        store: &mut S,
    ) -> Result<PipelineReport, MmrError>
    where
        I: Integrator + ?Sized,
        S: ResonanceStore + PhaseStore + LibrationStore + ?Sized,
    {
        let config_hash = stable_hash(&RunKey {
            config: self.config,
            range,
            window,
        })?;
        let mut state = self.resume_state(&config_hash)?;
        let mut report = PipelineReport::default();

        if state.stage == Stage::Start {
            report.integrated_batches = self.calc(range, window, integrator)?;
            report.stages.push(Stage::CalcDone);
            self.advance(&mut state, Stage::CalcDone)?;
        }
        if state.stage == Stage::CalcDone {
            let (handles, candidates) = self.load(range, store)?;
            report.mapped_batches = handles.len();
            report.candidates = candidates;
            state.batches = handles;
            report.stages.push(Stage::LoadDone);
            self.advance(&mut state, Stage::LoadDone)?;
        }
        if state.stage == Stage::LoadDone {
            let handles = if state.batches.is_empty() {
                None
            } else {
                Some(state.batches.as_slice())
            };
            self.find(handles, store, &mut report)?;
            report.stages.push(Stage::FindDone);
            self.advance(&mut state, Stage::FindDone)?;
        }

        self.state_file.clear()?;
        info!(
            integrated = report.integrated_batches,
            candidates = report.candidates,
            librations = report.librations,
            skipped = report.skipped,
            "pipeline finished"
        );
        Ok(report)
    }

    /// Integrates every batch of the range. Returns the number of batches.
    pub fn calc<I: Integrator + ?Sized>(
        &self,
        range: AsteroidRange,
        window: TimeWindow,
        integrator: &I,
    ) -> Result<usize, MmrError> {
        let catalog = self.catalog()?;
        let mut count = 0;
        for batch in catalog.batches(
            self.config.integrator.batch_size,
            Some(range.start),
            Some(range.stop),
        )? {
            let batch = batch?;
            integrator.integrate(&batch, &window, &self.config.integrator.aei_dir)?;
            count += 1;
        }
        info!(batches = count, "calc stage done");
        Ok(count)
    }

    /// Builds candidates for every batch and writes the mappings.
    ///
    /// The mapping directory is emptied once before the first batch.
    pub fn load<S: ResonanceStore + ?Sized>(
        &self,
        range: AsteroidRange,
        store: &mut S,
    ) -> Result<(Vec<BatchHandle>, usize), MmrError> {
        let catalog = self.catalog()?;
        let builder = self.builder()?;
        let rows = self.table(&builder)?;
        let dir = self.config.mapping_dir();
        reset_mapping_dir(&dir)?;

        let mut handles = Vec::new();
        let mut candidates = 0;
        for batch in catalog.batches(
            self.config.integrator.batch_size,
            Some(range.start),
            Some(range.stop),
        )? {
            let batch = batch?;
            let mapping = CandidateMapping {
                batch: batch.index,
                start: batch.start,
                stop: batch.stop,
                resonances: load_resonances(&rows, &batch.entries, &builder, store)?,
            };
            let path = mapping_path(&dir, batch.index);
            mapping.write(&path)?;
            candidates += mapping.candidates();
            debug!(batch = batch.index, candidates = mapping.candidates(), "mapping written");
            handles.push(mapping.handle(path));
        }
        info!(batches = handles.len(), candidates, "load stage done");
        Ok((handles, candidates))
    }

    /// Computes phases and librations for every candidate of the mappings.
    ///
    /// Without explicit handles the mapping directory is scanned.
    pub fn find<S>(
        &self,
        handles: Option<&[BatchHandle]>,
        store: &mut S,
        report: &mut PipelineReport,
    ) -> Result<(), MmrError>
    where
        S: ResonanceStore + PhaseStore + LibrationStore + ?Sized,
    {
        let discovered;
        let handles = match handles {
            Some(handles) => handles,
            None => {
                discovered = discover_mappings(&self.config.mapping_dir())?;
                discovered.as_slice()
            }
        };
        let context = FindContext {
            planets: self.load_planets()?,
            filter: self.config.coefficient_filter()?,
            finder: LibrationFinder::new(self.config.libration.settings()),
        };

        for handle in handles {
            let mapping = CandidateMapping::read(&handle.mapping)?;
            for (asteroid, ids) in &mapping.resonances {
                self.find_for_asteroid(&context, asteroid, ids, store, report)?;
            }
        }
        info!(
            checked = report.checked,
            librations = report.librations,
            "find stage done"
        );
        Ok(())
    }

    fn load_planets(&self) -> Result<Vec<ElementSeries>, MmrError> {
        self.config
            .planets
            .iter()
            .map(|planet| {
                load_aei(
                    &self.config.aei_path(planet),
                    self.config.integrator.aei_header_lines,
                )
            })
            .collect()
    }

    fn find_for_asteroid<S>(
        &self,
        context: &FindContext,
        asteroid: &str,
        ids: &[ResonanceId],
        store: &mut S,
        report: &mut PipelineReport,
    ) -> Result<(), MmrError>
    where
        S: ResonanceStore + PhaseStore + LibrationStore + ?Sized,
    {
        let series = load_aei(
            &self.config.aei_path(asteroid),
            self.config.integrator.aei_header_lines,
        )?;
        let planet_samples: Vec<&[OrbitalSample]> = context
            .planets
            .iter()
            .map(|p| p.samples.as_slice())
            .collect();

        for id in ids {
            let resonance = store.resonance(*id)?.ok_or_else(|| {
                MmrError::Storage(
                    ErrorInfo::new(codes::UNKNOWN_RESONANCE, "mapping refers to a missing resonance")
                        .with_context("id", id.to_string())
                        .with_context("asteroid", asteroid.to_string()),
                )
            })?;
            if !context.filter.matches(&resonance) {
                continue;
            }
            let phases = compute_phases(&resonance, &planet_samples, &series.samples)?;
            store.clear(*id)?;
            store.append_all(*id, &phases)?;
            report.checked += 1;
            match context.finder.find(asteroid, *id, store)? {
                Some(records) => report.librations += records.len(),
                None => report.skipped += 1,
            }
        }
        Ok(())
    }

    /// Drops stored phases of every resonance of the asteroids in `range`.
    pub fn clear_phases<S: ResonanceStore + PhaseStore + ?Sized>(
        &self,
        range: AsteroidRange,
        store: &mut S,
    ) -> Result<usize, MmrError> {
        let mut cleared = 0;
        for number in range.start..range.stop {
            for id in store.resonances_for(&format!("A{number}"))? {
                store.clear(id)?;
                cleared += 1;
            }
        }
        info!(cleared, "phases cleared");
        Ok(cleared)
    }
}
