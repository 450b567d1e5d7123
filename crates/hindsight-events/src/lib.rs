//! Journal record decoding and capability dispatch.
//!
//! A journal line enters through [`decode`], which is total: valid records of
//! a registered kind get a typed [`Payload`], anything else becomes an
//! `Unknown` or `Malformed` placeholder that still carries its raw text.
//!
//! What a record does to the aggregate states is expressed through the
//! capability traits in [`capability`]. Accumulators ask a record for each
//! capability they understand and hand themselves over as the mutation
//! target.
//!
//! # Modules
//!
//! - [`record`] -- [`EventRecord`] and [`Payload`]
//! - [`registry`] -- the kind table and the decode entry points
//! - [`kinds`] -- kind-specific payloads and their effects
//! - [`capability`] -- effect and target traits
//! - [`equivalence`] -- duplicate detection between records
//! - [`fields`] -- lenient document field access

pub mod capability;
pub mod equivalence;
pub mod fields;
pub mod kinds;
pub mod record;
pub mod registry;

pub use capability::{
    CommodityEffect, EventHeader, InventoryTarget, LedgerEffect, LedgerTarget, LoadoutEffect,
    LoadoutTarget, MaterialEffect, MicroResourceEffect, SuitEffect, SuitTarget,
};
pub use equivalence::EquivalenceRules;
pub use record::{EventRecord, Payload};
pub use registry::{decode, synthesize, try_decode};
