//! Capability contracts between decoded records and accumulators.
//!
//! A record kind declares what it affects by implementing zero or more
//! effect traits ([`CommodityEffect`], [`SuitEffect`], ...). Each effect
//! drives mutations on a *target* trait ([`InventoryTarget`], ...) that the
//! matching accumulator implements. Records never see accumulator types and
//! accumulators never match on record kinds.
//!
//! Capability lookup is static: [`EventRecord::as_commodity`] and friends
//! match on the payload and hand back a trait object when the kind has the
//! capability.
//!
//! [`EventRecord::as_commodity`]: crate::EventRecord::as_commodity

use chrono::{DateTime, Utc};
use hindsight_types::{Category, CountSlot, EventKind, LoadoutId, LoadoutModule, SuitId};
use rust_decimal::Decimal;

/// Kind and time of the record driving a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeader {
    /// Record kind.
    pub kind: EventKind,
    /// Record timestamp (UTC).
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Mutation targets
// ---------------------------------------------------------------------------

/// Mutation vocabulary of the inventory accumulator.
pub trait InventoryTarget {
    /// Set `slot` of item `fd_name` to an absolute `value`.
    fn set_value(&mut self, category: Category, fd_name: &str, slot: CountSlot, value: i32);

    /// Add `delta` to `slot` of item `fd_name`, never going below zero.
    ///
    /// A positive delta with a non-zero `price` folds into the item's
    /// weighted average purchase price.
    fn apply_delta(
        &mut self,
        category: Category,
        fd_name: &str,
        slot: CountSlot,
        delta: i32,
        price: Decimal,
    );

    /// Consume `count` units of an already-known item from the ship slot.
    fn craft(&mut self, fd_name: &str, count: i32);

    /// Zero `slot` for every item in `categories` that holds a count there.
    fn clear(&mut self, slot: CountSlot, categories: &[Category]);

    /// Replace the contents of `category` in `slot` with `values`.
    ///
    /// Listed items are set; items held but not listed are zeroed.
    fn update(&mut self, category: Category, values: &[(String, i32)], slot: CountSlot);
}

/// Mutation vocabulary of the suit accumulator.
pub trait SuitTarget {
    /// Record a purchased suit.
    fn buy(&mut self, time: DateTime<Utc>, id: SuitId, fd_name: &str, name_localised: &str, price: i64);

    /// Mark a suit sold.
    fn sell(&mut self, time: DateTime<Utc>, id: SuitId);

    /// Record the suit in use.
    fn switch_to(&mut self, time: DateTime<Utc>, id: SuitId);
}

/// Mutation vocabulary of the loadout accumulator.
pub trait LoadoutTarget {
    /// Whether a loadout with `id` has ever been recorded.
    fn has_loadout(&self, id: LoadoutId) -> bool;

    /// Record a new loadout with its fitted modules.
    fn create(
        &mut self,
        time: DateTime<Utc>,
        id: LoadoutId,
        name: &str,
        suit_id: SuitId,
        modules: &[LoadoutModule],
    );

    /// Mark a loadout deleted.
    fn delete(&mut self, time: DateTime<Utc>, id: LoadoutId);

    /// Mark every loadout belonging to `suit_id` deleted.
    fn delete_for_suit(&mut self, time: DateTime<Utc>, suit_id: SuitId);

    /// Fit `module` into its slot.
    fn equip(&mut self, time: DateTime<Utc>, id: LoadoutId, module: LoadoutModule);

    /// Empty `slot_name`.
    fn remove(&mut self, time: DateTime<Utc>, id: LoadoutId, slot_name: &str);

    /// Give a loadout a new name.
    fn rename(&mut self, time: DateTime<Utc>, id: LoadoutId, name: &str);

    /// Record the loadout in use.
    fn switch_to(&mut self, time: DateTime<Utc>, id: LoadoutId);
}

/// Mutation vocabulary of the credit ledger.
pub trait LedgerTarget {
    /// Record a credit movement. Negative amounts are spending.
    fn add_transaction(&mut self, header: EventHeader, note: &str, amount: i64);
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// The record changes ship cargo.
pub trait CommodityEffect {
    /// Apply the record's cargo changes.
    fn update_commodities(&self, target: &mut dyn InventoryTarget);
}

/// The record changes engineering materials.
pub trait MaterialEffect {
    /// Apply the record's material changes.
    fn update_materials(&self, target: &mut dyn InventoryTarget);
}

/// The record changes on-foot micro-resources.
pub trait MicroResourceEffect {
    /// Apply the record's micro-resource changes.
    fn update_micro_resources(&self, target: &mut dyn InventoryTarget);
}

/// The record changes owned suits.
pub trait SuitEffect {
    /// Apply the record's suit changes.
    fn update_suits(&self, header: EventHeader, target: &mut dyn SuitTarget);
}

/// The record changes suit loadouts.
pub trait LoadoutEffect {
    /// Apply the record's loadout changes.
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget);
}

/// The record moves credits.
pub trait LedgerEffect {
    /// Apply the record's credit movement.
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget);
}
