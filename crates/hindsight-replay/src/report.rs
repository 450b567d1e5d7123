//! Final state summary printed after a replay.

use hindsight_core::{GenerationMarkers, History};
use hindsight_types::{Holding, LoadoutId, Suit, SuitId, SuitLoadout};
use serde::Serialize;

/// Tallies of what happened to the lines of a journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayCounts {
    /// Non-blank lines read.
    pub lines: u64,
    /// Records folded into history.
    pub folded: u64,
    /// Records skipped as repeats of the previous entry.
    pub duplicates: u64,
    /// Records rejected as out of order.
    pub rejected: u64,
    /// Folded records whose kind is not registered.
    pub unknown: u64,
    /// Folded records that were not valid journal JSON.
    pub malformed: u64,
}

/// Aggregate state after the last folded record.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Line tallies.
    pub counts: ReplayCounts,
    /// Generations of each aggregate after the last record.
    pub markers: GenerationMarkers,
    /// Non-empty holdings, by internal name.
    pub inventory: Vec<Holding>,
    /// Units of cargo in the ship's hold.
    pub cargo: i64,
    /// Units carried in the backpack.
    pub backpack: i64,
    /// Owned suits.
    pub suits: Vec<Suit>,
    /// Suit in use.
    pub current_suit: Option<SuitId>,
    /// Every loadout, deleted ones included.
    pub loadouts: Vec<SuitLoadout>,
    /// Loadout in use.
    pub current_loadout: Option<LoadoutId>,
    /// Net credits moved by the journal.
    pub balance: i64,
}

impl ReplayReport {
    /// Summarize `history` as of its latest entry.
    pub fn from_history(history: &History, counts: ReplayCounts) -> Self {
        let markers = history.latest_markers();
        let inventory = history.inventory();

        Self {
            counts,
            markers,
            inventory: inventory
                .snapshot(markers.inventory)
                .into_values()
                .filter(|h| h.is_non_zero())
                .map(|h| Holding::clone(&h))
                .collect(),
            cargo: inventory.cargo_count(markers.inventory),
            backpack: inventory.backpack_count(markers.inventory),
            suits: history
                .suits()
                .suits(markers.suits)
                .into_values()
                .map(|s| Suit::clone(&s))
                .collect(),
            current_suit: history.suits().current_id(markers.suits),
            loadouts: history
                .loadouts()
                .loadouts(markers.loadouts)
                .into_values()
                .map(|l| SuitLoadout::clone(&l))
                .collect(),
            current_loadout: history.loadouts().current_id(markers.loadouts),
            balance: history.ledger().balance(markers.ledger),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_latest_state() {
        let mut history = History::with_defaults();
        history
            .ingest(r#"{"timestamp":"2021-05-20T18:00:00Z","event":"MarketBuy","Type":"gold","Count":4,"BuyPrice":9000,"TotalCost":36000}"#)
            .unwrap();
        history
            .ingest(r#"{"timestamp":"2021-05-20T18:01:00Z","event":"BuySuit","Name":"UtilitySuit_Class1","Name_Localised":"Maverick Suit","Price":150000,"SuitID":1700}"#)
            .unwrap();

        let report = ReplayReport::from_history(&history, ReplayCounts::default());
        assert_eq!(report.inventory.len(), 1);
        assert_eq!(report.cargo, 4);
        assert_eq!(report.suits.len(), 1);
        assert_eq!(report.balance, -186_000);
        assert!(report.loadouts.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["balance"], -186_000);
    }

    #[test]
    fn empty_history_reports_nothing() {
        let report = ReplayReport::from_history(&History::with_defaults(), ReplayCounts::default());
        assert!(report.inventory.is_empty());
        assert_eq!(report.balance, 0);
        assert_eq!(report.current_suit, None);
    }
}
