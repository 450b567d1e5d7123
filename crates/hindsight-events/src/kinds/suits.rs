//! Suit purchase and sale records.

use hindsight_types::SuitId;

use crate::capability::{
    EventHeader, LedgerEffect, LedgerTarget, LoadoutEffect, LoadoutTarget, SuitEffect, SuitTarget,
};
use crate::fields::Fields;

/// `BuySuit`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuySuit {
    /// Identifier of the new suit.
    pub suit_id: SuitId,
    /// Suit type internal name, lower-cased.
    pub name: String,
    /// Localised suit name.
    pub name_localised: String,
    /// Credits paid.
    pub price: i64,
}

impl BuySuit {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            suit_id: SuitId(f.u64("SuitID")),
            name: f.lower("Name"),
            name_localised: f.str("Name_Localised"),
            price: f.i64("Price"),
        }
    }
}

impl SuitEffect for BuySuit {
    fn update_suits(&self, header: EventHeader, target: &mut dyn SuitTarget) {
        target.buy(
            header.timestamp,
            self.suit_id,
            &self.name,
            &self.name_localised,
            self.price,
        );
    }
}

impl LedgerEffect for BuySuit {
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget) {
        target.add_transaction(header, &self.name_localised, self.price.saturating_neg());
    }
}

/// `SellSuit`. Selling a suit also retires every loadout built on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SellSuit {
    /// Identifier of the sold suit.
    pub suit_id: SuitId,
    /// Suit type internal name, lower-cased.
    pub name: String,
    /// Localised suit name.
    pub name_localised: String,
    /// Credits received.
    pub price: i64,
}

impl SellSuit {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            suit_id: SuitId(f.u64("SuitID")),
            name: f.lower("Name"),
            name_localised: f.str("Name_Localised"),
            price: f.i64("Price"),
        }
    }
}

impl SuitEffect for SellSuit {
    fn update_suits(&self, header: EventHeader, target: &mut dyn SuitTarget) {
        target.sell(header.timestamp, self.suit_id);
    }
}

impl LoadoutEffect for SellSuit {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        target.delete_for_suit(header.timestamp, self.suit_id);
    }
}

impl LedgerEffect for SellSuit {
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget) {
        target.add_transaction(header, &self.name_localised, self.price);
    }
}
