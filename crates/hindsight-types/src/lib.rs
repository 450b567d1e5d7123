//! Shared type definitions for the Hindsight journal engine.
//!
//! This crate holds the vocabulary every other crate speaks: identifiers,
//! enumerations, and the aggregate values the accumulators version. Types
//! flow downstream to `TypeScript` via `ts-rs` for query collaborators.
//!
//! # Modules
//!
//! - [`ids`] -- [`Generation`] markers and journal identifiers
//! - [`enums`] -- item categories, count slots and event kinds
//! - [`structs`] -- holdings, suits, loadouts and ledger tallies

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{COUNT_SLOTS, Category, CountSlot, EventKind};
pub use ids::{EntryId, Generation, LoadoutId, SuitId, SuitModuleId};
pub use structs::{Holding, LedgerTally, LoadoutModule, MaterialDescriptor, Suit, SuitLoadout};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::Generation::export_all();
        let _ = crate::ids::SuitId::export_all();
        let _ = crate::ids::LoadoutId::export_all();
        let _ = crate::ids::SuitModuleId::export_all();
        let _ = crate::ids::EntryId::export_all();

        // Enums
        let _ = crate::enums::Category::export_all();
        let _ = crate::enums::CountSlot::export_all();
        let _ = crate::enums::EventKind::export_all();

        // Structs
        let _ = crate::structs::MaterialDescriptor::export_all();
        let _ = crate::structs::Holding::export_all();
        let _ = crate::structs::Suit::export_all();
        let _ = crate::structs::LoadoutModule::export_all();
        let _ = crate::structs::SuitLoadout::export_all();
        let _ = crate::structs::LedgerTally::export_all();
    }
}
