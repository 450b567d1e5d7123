//! Death and rebuy records.

use hindsight_types::{Category, CountSlot};

use crate::capability::{CommodityEffect, EventHeader, InventoryTarget, LedgerEffect, LedgerTarget};
use crate::fields::Fields;

/// One party credited with a kill.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Killer {
    /// Internal name.
    pub name: String,
    /// Localised name; falls back to `name`.
    pub name_localised: String,
    /// Ship type, when known.
    pub ship: String,
    /// Combat rank, when known.
    pub rank: String,
}

/// `Died`: the commander was killed.
///
/// Death empties the ship's cargo hold and the on-foot backpack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Died {
    /// Who did it. Empty when the journal does not say.
    pub killers: Vec<Killer>,
}

impl Killer {
    fn new(name: String, localised: String, ship: String, rank: String) -> Self {
        Self {
            name_localised: if localised.is_empty() { name.clone() } else { localised },
            name,
            ship,
            rank,
        }
    }
}

impl Died {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        let killer_name = f.str("KillerName");
        let killers = if killer_name.is_empty() {
            if f.has("Killers") {
                f.objects("Killers")
                    .map(|k| Killer::new(k.str("Name"), k.str("Name_Localised"), k.str("Ship"), k.str("Rank")))
                    .collect()
            } else {
                // Automated defences are only named by their "ship".
                let ship = f.str("KillerShip");
                if ship.is_empty() {
                    Vec::new()
                } else {
                    vec![Killer::new(ship, String::new(), String::new(), String::new())]
                }
            }
        } else {
            vec![Killer::new(
                killer_name,
                f.str("KillerName_Localised"),
                f.str("KillerShip"),
                f.str("KillerRank"),
            )]
        };
        Self { killers }
    }
}

impl CommodityEffect for Died {
    fn update_commodities(&self, target: &mut dyn InventoryTarget) {
        target.clear(CountSlot::Ship, &[Category::Commodity]);
        target.clear(CountSlot::Backpack, &Category::MICRO_RESOURCES);
    }
}

/// `Resurrect`: the commander paid the rebuy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resurrect {
    /// Rebuy option chosen (`rebuy`, `recover`, ...).
    pub option: String,
    /// Credits paid.
    pub cost: i64,
    /// Whether the commander was declared bankrupt.
    pub bankrupt: bool,
}

impl Resurrect {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            option: f.str("Option"),
            cost: f.i64("Cost"),
            bankrupt: f.bool("Bankrupt"),
        }
    }
}

impl LedgerEffect for Resurrect {
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget) {
        target.add_transaction(header, &self.option, self.cost.saturating_neg());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn died(doc: &serde_json::Value) -> Died {
        Fields::of(doc).map(Died::from_fields).unwrap_or_default()
    }

    #[test]
    fn single_named_killer() {
        let d = died(&json!({ "KillerName": "Cmdr Bob", "KillerShip": "anaconda", "KillerRank": "Elite" }));
        assert_eq!(d.killers.len(), 1);
        assert_eq!(d.killers.first().map(|k| k.name_localised.as_str()), Some("Cmdr Bob"));
    }

    #[test]
    fn wing_of_killers() {
        let d = died(&json!({ "Killers": [ { "Name": "A", "Ship": "viper" }, { "Name": "B" } ] }));
        assert_eq!(d.killers.len(), 2);
    }

    #[test]
    fn automated_defence_named_by_ship() {
        let d = died(&json!({ "KillerShip": "skimmer" }));
        assert_eq!(d.killers.first().map(|k| k.name.as_str()), Some("skimmer"));
        assert!(died(&json!({})).killers.is_empty());
    }
}
