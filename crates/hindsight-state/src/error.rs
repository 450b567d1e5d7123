//! Error types for the domain accumulators.

use hindsight_store::StoreError;
use hindsight_types::EventKind;

/// Errors that abort a fold step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The underlying store rejected the fold protocol.
    #[error("{accumulator} could not fold {kind}: {source}")]
    Store {
        /// Which accumulator was folding.
        accumulator: &'static str,
        /// Kind of the record being folded.
        kind: EventKind,
        /// The store invariant that was violated.
        source: StoreError,
    },
}

impl StateError {
    pub(crate) const fn store(accumulator: &'static str, kind: EventKind, source: StoreError) -> Self {
        Self::Store {
            accumulator,
            kind,
            source,
        }
    }
}
