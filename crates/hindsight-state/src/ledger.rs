//! Credit ledger.
//!
//! Tracks a running balance of the credit movements journal records report,
//! plus a per-kind tally. Every transaction writes both keys in the same
//! generation.

use std::collections::BTreeMap;
use std::sync::Arc;

use hindsight_events::{EventHeader, EventRecord, LedgerTarget};
use hindsight_store::{GenerationalMap, StoreReader};
use hindsight_types::{EventKind, Generation, LedgerTally};

use crate::Accumulator;
use crate::error::StateError;

/// Store key for the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LedgerKey {
    /// The overall running balance.
    Balance,
    /// Running total of one record kind.
    Kind(EventKind),
}

/// Versioned running credit balance.
#[derive(Debug, Default)]
pub struct CreditLedger {
    tallies: GenerationalMap<LedgerKey, LedgerTally>,
}

impl CreditLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only handle for other threads.
    pub fn reader(&self) -> StoreReader<LedgerKey, LedgerTally> {
        self.tallies.reader()
    }

    /// Net credits moved up to and including `generation`.
    pub fn balance(&self, generation: Generation) -> i64 {
        self.tally(generation).map_or(0, |t| t.total)
    }

    /// Overall tally as of `generation`.
    pub fn tally(&self, generation: Generation) -> Option<Arc<LedgerTally>> {
        self.tallies.get(&LedgerKey::Balance, generation)
    }

    /// Per-kind tallies as of `generation`.
    pub fn by_kind(&self, generation: Generation) -> BTreeMap<EventKind, Arc<LedgerTally>> {
        self.tallies
            .snapshot(generation)
            .into_iter()
            .filter_map(|(key, tally)| match key {
                LedgerKey::Kind(kind) => Some((kind, tally)),
                LedgerKey::Balance => None,
            })
            .collect()
    }

    fn post(&mut self, key: LedgerKey, header: EventHeader, note: &str, amount: i64) {
        let mut tally = self
            .tallies
            .get_latest(&key)
            .map_or_else(LedgerTally::new, |t| (*t).clone());
        tally.total = tally.total.saturating_add(amount);
        tally.transactions = tally.transactions.saturating_add(1);
        tally.last_kind = Some(header.kind);
        tally.last_time = Some(header.timestamp);
        tally.last_note = String::from(note);
        tally.last_amount = amount;
        self.tallies.put(key, tally);
    }
}

impl LedgerTarget for CreditLedger {
    fn add_transaction(&mut self, header: EventHeader, note: &str, amount: i64) {
        self.post(LedgerKey::Balance, header, note, amount);
        self.post(LedgerKey::Kind(header.kind), header, note, amount);
    }
}

impl Accumulator for CreditLedger {
    const NAME: &'static str = "ledger";

    fn process(&mut self, record: &EventRecord) -> Result<Generation, StateError> {
        let Some(effect) = record.as_ledger() else {
            return Ok(self.tallies.current_generation());
        };
        let fail = |e| StateError::store(Self::NAME, record.kind(), e);

        self.tallies.begin_generation().map_err(fail)?;
        effect.update_ledger(record.header(), self);
        self.tallies.finish_generation().map_err(fail)
    }

    fn current_generation(&self) -> Generation {
        self.tallies.current_generation()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hindsight_events::decode;

    use super::*;

    #[test]
    fn fares_refunds_and_rebuys() {
        let mut ledger = CreditLedger::new();
        let booked = ledger
            .process(&decode(r#"{"timestamp":"2021-05-20T18:00:00Z","event":"BookTaxi","Cost":300,"DestinationSystem":"Sol","DestinationLocation":"Abraham Lincoln"}"#))
            .unwrap();
        let refunded = ledger
            .process(&decode(r#"{"timestamp":"2021-05-20T18:01:00Z","event":"CancelTaxi","Refund":300}"#))
            .unwrap();
        let rebuy = ledger
            .process(&decode(r#"{"timestamp":"2021-05-20T18:02:00Z","event":"Resurrect","Option":"rebuy","Cost":1000,"Bankrupt":false}"#))
            .unwrap();

        assert_eq!(ledger.balance(booked), -300);
        assert_eq!(ledger.tally(booked).unwrap().last_note, "->Sol:Abraham Lincoln");
        assert_eq!(ledger.balance(refunded), 0);
        assert_eq!(ledger.balance(rebuy), -1000);
        assert_eq!(ledger.tally(rebuy).unwrap().transactions, 3);
        assert_eq!(ledger.by_kind(rebuy).len(), 3);
    }

    #[test]
    fn free_bookings_and_empty_refunds_are_not_transactions() {
        let mut ledger = CreditLedger::new();
        let g = ledger
            .process(&decode(r#"{"timestamp":"2021-05-20T18:00:00Z","event":"BookDropship","Cost":0}"#))
            .unwrap();
        assert_eq!(g, Generation::ZERO);
        let g = ledger
            .process(&decode(r#"{"timestamp":"2021-05-20T18:00:00Z","event":"CancelDropship"}"#))
            .unwrap();
        assert_eq!(g, Generation::ZERO);
    }

    #[test]
    fn free_rebuy_is_still_recorded() {
        let mut ledger = CreditLedger::new();
        let g = ledger
            .process(&decode(r#"{"timestamp":"2021-05-20T18:00:00Z","event":"Resurrect","Option":"free","Cost":0}"#))
            .unwrap();
        assert_eq!(g, Generation(1));
        assert_eq!(ledger.balance(g), 0);
        assert_eq!(ledger.tally(g).unwrap().last_kind, Some(EventKind::Resurrect));
    }
}
