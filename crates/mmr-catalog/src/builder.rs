use std::collections::BTreeMap;

use mmr_core::errors::MmrError;
use mmr_core::{BodyCount, Resonance, ResonanceId, ResonanceStore};
use tracing::debug;

use crate::catalog::CatalogEntry;
use crate::table::TableRow;

/// Materialises resonance candidates for asteroids from table rows.
#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    planets: Vec<String>,
    axis_swing: f64,
    body_count: BodyCount,
}

impl CandidateBuilder {
    /// Creates a builder for one or two perturbing planets.
    pub fn new(planets: Vec<String>, axis_swing: f64) -> Result<Self, MmrError> {
        let body_count = BodyCount::from_planets(planets.len())?;
        Ok(Self {
            planets,
            axis_swing,
            body_count,
        })
    }

    /// Layout of the rows this builder expects.
    pub fn body_count(&self) -> BodyCount {
        self.body_count
    }

    /// Returns exactly the rows whose reference axis lies within the swing.
    pub fn select<'a>(
        &'a self,
        rows: &'a [TableRow],
        axis: f64,
    ) -> impl Iterator<Item = &'a TableRow> + 'a {
        rows.iter().filter(move |row| (row.axis - axis).abs() <= self.axis_swing)
    }

    /// Builds the candidate resonances of one asteroid without persisting them.
    pub fn resonances(
        &self,
        rows: &[TableRow],
        asteroid: &CatalogEntry,
    ) -> Result<Vec<Resonance>, MmrError> {
        let name = asteroid.body_name();
        self.select(rows, asteroid.axis())
            .map(|row| Resonance::from_integers(&self.planets, &row.integers, row.axis, &name))
            .collect()
    }

    /// Builds and persists the candidates of one asteroid, returning their ids.
    pub fn build<S: ResonanceStore + ?Sized>(
        &self,
        rows: &[TableRow],
        asteroid: &CatalogEntry,
        store: &mut S,
    ) -> Result<Vec<ResonanceId>, MmrError> {
        let resonances = self.resonances(rows, asteroid)?;
        let mut ids = Vec::with_capacity(resonances.len());
        for resonance in &resonances {
            ids.push(store.persist_resonance(resonance)?);
        }
        debug!(
            asteroid = %asteroid.body_name(),
            candidates = ids.len(),
            "built resonance candidates"
        );
        Ok(ids)
    }
}

/// Builds candidates for every asteroid of a batch.
///
/// Asteroids without candidates are left out of the mapping.
pub fn load_resonances<S: ResonanceStore + ?Sized>(
    rows: &[TableRow],
    batch: &[CatalogEntry],
    builder: &CandidateBuilder,
    store: &mut S,
) -> Result<BTreeMap<String, Vec<ResonanceId>>, MmrError> {
    let mut mapping = BTreeMap::new();
    for asteroid in batch {
        let ids = builder.build(rows, asteroid, store)?;
        if !ids.is_empty() {
            mapping.insert(asteroid.body_name(), ids);
        }
    }
    Ok(mapping)
}
