//! Aggregate value types stored by the domain accumulators.
//!
//! Every struct here is a complete, self-contained version of one key in a
//! versioned store. Accumulators never mutate a stored value; they clone the
//! latest version, change the clone, and append it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{COUNT_SLOTS, Category, CountSlot, EventKind};
use crate::ids::{LoadoutId, SuitId, SuitModuleId};

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Static description of an inventory item, resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MaterialDescriptor {
    /// Item category.
    pub category: Category,
    /// Internal (journal) name, lower-cased.
    pub fd_name: String,
    /// Human-readable name.
    pub name: String,
}

/// One version of an inventory item: its counts and average purchase price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Holding {
    /// The item this holding counts.
    pub descriptor: MaterialDescriptor,
    /// Counts indexed by [`CountSlot::index`].
    pub counts: [i32; COUNT_SLOTS],
    /// Weighted average purchase price per unit.
    #[ts(as = "String")]
    pub price: Decimal,
}

impl Holding {
    /// A zero-valued baseline for an item never seen before.
    pub const fn new(descriptor: MaterialDescriptor) -> Self {
        Self {
            descriptor,
            counts: [0; COUNT_SLOTS],
            price: Decimal::ZERO,
        }
    }

    /// The count held in `slot`.
    pub fn count(&self, slot: CountSlot) -> i32 {
        self.counts.get(slot.index()).copied().unwrap_or(0)
    }

    /// Mutable access to the count held in `slot`.
    pub fn count_mut(&mut self, slot: CountSlot) -> Option<&mut i32> {
        self.counts.get_mut(slot.index())
    }

    /// Whether any slot holds a non-zero count.
    pub fn is_non_zero(&self) -> bool {
        self.counts.iter().any(|c| *c != 0)
    }

    /// The item's category.
    pub const fn category(&self) -> Category {
        self.descriptor.category
    }
}

// ---------------------------------------------------------------------------
// Suits
// ---------------------------------------------------------------------------

/// One version of a suit.
///
/// Selling a suit appends a version with `sold` set; history is never removed.
/// The "current suit" marker is stored as a `Suit` with an empty `fd_name`
/// whose `id` names the suit in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Suit {
    /// Time of the event that produced this version.
    pub event_time: DateTime<Utc>,
    /// Suit identifier.
    pub id: SuitId,
    /// Internal suit type name; empty for the current-suit marker.
    pub fd_name: String,
    /// Localised display name.
    pub name_localised: String,
    /// Purchase price; 0 when unknown.
    pub price: i64,
    /// Tombstone flag.
    pub sold: bool,
}

impl Suit {
    /// A marker version recording which suit is in use.
    pub const fn marker(event_time: DateTime<Utc>, id: SuitId) -> Self {
        Self {
            event_time,
            id,
            fd_name: String::new(),
            name_localised: String::new(),
            price: 0,
            sold: false,
        }
    }
}

/// A module fitted into a loadout slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoadoutModule {
    /// Slot name, lower-cased.
    pub slot_name: String,
    /// Module identifier.
    pub suit_module_id: SuitModuleId,
    /// Internal module name, lower-cased.
    pub module_name: String,
    /// Localised module name.
    pub module_name_localised: String,
}

/// One version of a suit loadout.
///
/// Module changes clone the whole loadout and append it as one unit; the
/// `modules` sub-map is never versioned on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SuitLoadout {
    /// Time of the event that produced this version.
    pub event_time: DateTime<Utc>,
    /// Loadout identifier.
    pub id: LoadoutId,
    /// The suit this loadout belongs to.
    pub suit_id: SuitId,
    /// Loadout name; empty for the current-loadout marker.
    pub name: String,
    /// Tombstone flag.
    pub deleted: bool,
    /// Fitted modules keyed by slot name.
    pub modules: BTreeMap<String, LoadoutModule>,
}

impl SuitLoadout {
    /// A marker version recording which loadout is in use.
    pub const fn marker(event_time: DateTime<Utc>, id: LoadoutId) -> Self {
        Self {
            event_time,
            id,
            suit_id: SuitId(0),
            name: String::new(),
            deleted: false,
            modules: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// One version of a credit tally: the running total and the last movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerTally {
    /// Running total in credits.
    pub total: i64,
    /// Number of transactions folded into this tally.
    pub transactions: u32,
    /// Kind of the event behind the last transaction.
    pub last_kind: Option<EventKind>,
    /// Time of the last transaction.
    pub last_time: Option<DateTime<Utc>>,
    /// Free-form note attached to the last transaction.
    pub last_note: String,
    /// Credit movement of the last transaction.
    pub last_amount: i64,
}

impl LedgerTally {
    /// An empty tally.
    pub const fn new() -> Self {
        Self {
            total: 0,
            transactions: 0,
            last_kind: None,
            last_time: None,
            last_note: String::new(),
            last_amount: 0,
        }
    }
}

impl Default for LedgerTally {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tritium() -> MaterialDescriptor {
        MaterialDescriptor {
            category: Category::Commodity,
            fd_name: String::from("tritium"),
            name: String::from("Tritium"),
        }
    }

    #[test]
    fn new_holding_is_zero() {
        let h = Holding::new(tritium());
        assert!(!h.is_non_zero());
        assert_eq!(h.count(CountSlot::Ship), 0);
        assert_eq!(h.count(CountSlot::Backpack), 0);
        assert_eq!(h.price, Decimal::ZERO);
    }

    #[test]
    fn count_mut_writes_one_slot() {
        let mut h = Holding::new(tritium());
        if let Some(c) = h.count_mut(CountSlot::Backpack) {
            *c = 4;
        }
        assert_eq!(h.counts, [0, 4]);
        assert!(h.is_non_zero());
    }

    #[test]
    fn holding_serializes_price_as_string() {
        let mut h = Holding::new(tritium());
        h.price = Decimal::new(5125, 1);
        let json = serde_json::to_value(&h).ok();
        let price = json.as_ref().and_then(|v| v.get("price")).cloned();
        assert_eq!(price, Some(serde_json::json!("512.5")));
    }
}
