//! Commodity market and cargo hold records.

use hindsight_types::{Category, CountSlot};
use rust_decimal::Decimal;

use crate::capability::{CommodityEffect, EventHeader, InventoryTarget, LedgerEffect, LedgerTarget};
use crate::fields::Fields;

/// Direction of a market transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradeSide {
    /// Goods bought into the hold.
    #[default]
    Buy,
    /// Goods sold out of the hold.
    Sell,
}

/// `MarketBuy` / `MarketSell`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarketTrade {
    /// Buy or sell.
    pub side: TradeSide,
    /// Commodity internal name, lower-cased.
    pub commodity: String,
    /// Localised commodity name.
    pub commodity_localised: String,
    /// Units traded.
    pub count: i32,
    /// Price per unit.
    pub unit_price: i64,
    /// Total credits moved.
    pub total: i64,
}

impl MarketTrade {
    pub(crate) fn from_fields(f: Fields<'_>, side: TradeSide) -> Self {
        let (unit_key, total_key) = match side {
            TradeSide::Buy => ("BuyPrice", "TotalCost"),
            TradeSide::Sell => ("SellPrice", "TotalSale"),
        };
        Self {
            side,
            commodity: f.lower("Type"),
            commodity_localised: f.str("Type_Localised"),
            count: f.count("Count"),
            unit_price: f.i64(unit_key),
            total: f.i64(total_key),
        }
    }
}

impl CommodityEffect for MarketTrade {
    fn update_commodities(&self, target: &mut dyn InventoryTarget) {
        match self.side {
            TradeSide::Buy => target.apply_delta(
                Category::Commodity,
                &self.commodity,
                CountSlot::Ship,
                self.count,
                Decimal::from(self.unit_price),
            ),
            TradeSide::Sell => target.apply_delta(
                Category::Commodity,
                &self.commodity,
                CountSlot::Ship,
                self.count.saturating_neg(),
                Decimal::ZERO,
            ),
        }
    }
}

impl LedgerEffect for MarketTrade {
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget) {
        let note = format!("{} {}", self.commodity, self.count);
        let amount = match self.side {
            TradeSide::Buy => self.total.saturating_neg(),
            TradeSide::Sell => self.total,
        };
        target.add_transaction(header, &note, amount);
    }
}

/// `EjectCargo`: goods jettisoned from the hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EjectCargo {
    /// Commodity internal name, lower-cased.
    pub commodity: String,
    /// Units ejected.
    pub count: i32,
    /// Whether the cargo was abandoned rather than dropped for someone.
    pub abandoned: bool,
}

impl EjectCargo {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            commodity: f.lower("Type"),
            count: f.count("Count"),
            abandoned: f.bool("Abandoned"),
        }
    }
}

impl CommodityEffect for EjectCargo {
    fn update_commodities(&self, target: &mut dyn InventoryTarget) {
        target.apply_delta(
            Category::Commodity,
            &self.commodity,
            CountSlot::Ship,
            self.count.saturating_neg(),
            Decimal::ZERO,
        );
    }
}

/// `Cargo`: a full listing of a vessel's hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cargo {
    /// `Ship` or `SRV`; empty on old journals, which always meant the ship.
    pub vessel: String,
    /// Lower-cased commodity names and counts. `None` when the record only
    /// announces that the listing was written elsewhere.
    pub inventory: Option<Vec<(String, i32)>>,
}

impl Cargo {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        let inventory = f.has("Inventory").then(|| {
            f.objects("Inventory")
                .map(|item| (item.lower("Name"), item.count("Count")))
                .collect()
        });
        Self {
            vessel: f.str("Vessel"),
            inventory,
        }
    }

    /// Whether the listing describes the ship's hold.
    pub fn is_ship(&self) -> bool {
        self.vessel.is_empty() || self.vessel.eq_ignore_ascii_case("Ship")
    }
}

impl CommodityEffect for Cargo {
    fn update_commodities(&self, target: &mut dyn InventoryTarget) {
        if let Some(inventory) = self.inventory.as_ref().filter(|_| self.is_ship()) {
            target.update(Category::Commodity, inventory, CountSlot::Ship);
        }
    }
}
