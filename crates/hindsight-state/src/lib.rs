//! Domain accumulators over generational stores.
//!
//! Each accumulator owns one [`GenerationalMap`] and folds journal records
//! into it one at a time. A fold step opens a generation, lets the record
//! drive the accumulator's mutation vocabulary, and closes the generation;
//! a step that changed nothing is rolled back. The returned generation is
//! the version marker callers keep to ask "what did this look like right
//! after that record".
//!
//! # Modules
//!
//! - [`inventory`] -- commodities, materials and micro-resources
//! - [`suits`] -- owned suits
//! - [`loadouts`] -- suit loadouts and their fitted modules
//! - [`ledger`] -- running credit balance
//! - [`catalog`] -- static item descriptions
//! - [`error`] -- [`StateError`]
//!
//! [`GenerationalMap`]: hindsight_store::GenerationalMap

pub mod catalog;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod loadouts;
pub mod suits;

pub use catalog::Catalog;
pub use error::StateError;
pub use inventory::MaterialCommodityList;
pub use ledger::{CreditLedger, LedgerKey};
pub use loadouts::{LoadoutKey, SuitLoadoutList};
pub use suits::{SuitKey, SuitList};

use hindsight_events::EventRecord;
use hindsight_types::Generation;

/// A versioned aggregate built by folding records.
pub trait Accumulator {
    /// Name used in logs and errors.
    const NAME: &'static str;

    /// Fold one record and return the accumulator's generation afterwards.
    ///
    /// Records the accumulator has no capability for leave the generation
    /// unchanged.
    fn process(&mut self, record: &EventRecord) -> Result<Generation, StateError>;

    /// The accumulator's current generation.
    fn current_generation(&self) -> Generation;
}
