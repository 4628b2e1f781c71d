#![deny(missing_docs)]
#![doc = "Asteroid catalog access, resonance table parsing and candidate selection."]

/// Candidate resonance selection by semi-major axis.
pub mod builder;
/// Numbered asteroid catalog reader.
pub mod catalog;
pub mod filter;
/// Resonance table parsing.
pub mod table;

pub use builder::{load_resonances, CandidateBuilder};
pub use catalog::{
    parse_entry, CatalogBatch, CatalogBatches, CatalogElements, CatalogEntries, CatalogEntry,
    CatalogReader, ASTDYS_CATALOG_URL,
};
pub use filter::{CoefficientFilter, IntegerFilter};
pub use table::{load_table, parse_row, TableRow};
