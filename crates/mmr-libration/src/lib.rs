#![deny(missing_docs)]
#![doc = "Circulation break detection and libration classification of resonant phases."]

pub mod circulation;
pub mod classifier;
/// Per-resonance libration search over stored phases.
pub mod finder;

pub use circulation::find_circulation_breaks;
pub use classifier::{classify, ClassifierSettings, Libration};
pub use finder::LibrationFinder;
