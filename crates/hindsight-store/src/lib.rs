//! Generational versioned storage.
//!
//! The store keeps every version of every key, tagged with the generation it
//! was written at. A generation is one fold step: the accumulators open one
//! per record, write zero or more complete values, and close it. Empty steps
//! are rolled back so generation numbers stay dense.
//!
//! # Modules
//!
//! - [`entry`] -- the ordered version list of a single key
//! - [`map`] -- [`GenerationalMap`], the writer side and fold protocol
//! - [`reader`] -- [`StoreReader`], shared read-only handles

pub mod entry;
pub mod map;
pub mod reader;

pub use entry::{Version, VersionedEntry};
pub use map::GenerationalMap;
pub use reader::StoreReader;

use hindsight_types::Generation;

/// Invariant violations raised by the fold protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A new generation was requested while an empty one is still open.
    #[error("generation {generation} was opened but never written or abandoned")]
    GenerationLeftOpen {
        /// The generation left open.
        generation: Generation,
    },

    /// Abandon or finish was called with no generation open.
    #[error("no generation is open")]
    NoOpenGeneration,

    /// The generation counter cannot advance any further.
    #[error("generation counter exhausted")]
    GenerationOverflow,
}
