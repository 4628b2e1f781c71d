#![deny(missing_docs)]
#![doc = "Storage backends implementing the resonance, phase and libration capabilities."]

/// CSV and JSON export of librations.
pub mod export;
/// Phase samples in per-resonance JSON lines files.
pub mod file;
/// In-memory backend.
pub mod memory;
pub mod schema;
/// SQLite backend.
pub mod sqlite;
/// Configured composition of the backends.
pub mod storage;

pub use export::{export_csv, export_json, libration_rows, LibrationRow};
pub use file::FilePhaseStore;
pub use memory::MemoryStore;
pub use schema::{init_schema, SCHEMA_VERSION};
pub use sqlite::SqliteStore;
pub use storage::{PhaseStorage, Storage};
