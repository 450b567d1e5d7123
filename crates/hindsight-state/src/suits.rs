//! Owned suits.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hindsight_events::{EventRecord, SuitTarget};
use hindsight_store::{GenerationalMap, StoreReader};
use hindsight_types::{Generation, Suit, SuitId};
use tracing::warn;

use crate::Accumulator;
use crate::error::StateError;

/// Store key for the suit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuitKey {
    /// Marker recording which suit is in use.
    Current,
    /// A purchased suit.
    Suit(SuitId),
}

/// Versioned list of suits, including sold ones.
#[derive(Debug, Default)]
pub struct SuitList {
    suits: GenerationalMap<SuitKey, Suit>,
}

impl SuitList {
    /// An empty suit list.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only handle for other threads.
    pub fn reader(&self) -> StoreReader<SuitKey, Suit> {
        self.suits.reader()
    }

    /// Suits owned (bought and not sold) as of `generation`.
    pub fn suits(&self, generation: Generation) -> BTreeMap<SuitId, Arc<Suit>> {
        self.suits
            .snapshot_where(generation, |s| !s.sold)
            .into_iter()
            .filter_map(|(key, suit)| match key {
                SuitKey::Suit(id) => Some((id, suit)),
                SuitKey::Current => None,
            })
            .collect()
    }

    /// Suit `id` as of `generation`, sold or not.
    pub fn suit(&self, id: SuitId, generation: Generation) -> Option<Arc<Suit>> {
        self.suits.get(&SuitKey::Suit(id), generation)
    }

    /// The suit in use as of `generation`.
    pub fn current_id(&self, generation: Generation) -> Option<SuitId> {
        self.suits
            .get(&SuitKey::Current, generation)
            .map(|marker| marker.id)
    }
}

impl SuitTarget for SuitList {
    fn buy(&mut self, time: DateTime<Utc>, id: SuitId, fd_name: &str, name_localised: &str, price: i64) {
        self.suits.put(
            SuitKey::Suit(id),
            Suit {
                event_time: time,
                id,
                fd_name: String::from(fd_name),
                name_localised: String::from(name_localised),
                price,
                sold: false,
            },
        );
    }

    fn sell(&mut self, time: DateTime<Utc>, id: SuitId) {
        let key = SuitKey::Suit(id);
        match self.suits.get_latest(&key) {
            Some(last) if !last.sold => {
                let mut sold = (*last).clone();
                sold.event_time = time;
                sold.sold = true;
                self.suits.put(key, sold);
            }
            Some(_) => warn!(suit = %id, "sold a suit already sold"),
            None => warn!(suit = %id, "sold a suit never seen"),
        }
    }

    fn switch_to(&mut self, time: DateTime<Utc>, id: SuitId) {
        if self.suits.get_latest(&SuitKey::Current).is_some_and(|m| m.id == id) {
            return;
        }
        self.suits.put(SuitKey::Current, Suit::marker(time, id));
    }
}

impl Accumulator for SuitList {
    const NAME: &'static str = "suits";

    fn process(&mut self, record: &EventRecord) -> Result<Generation, StateError> {
        let Some(effect) = record.as_suit() else {
            return Ok(self.suits.current_generation());
        };
        let fail = |e| StateError::store(Self::NAME, record.kind(), e);

        self.suits.begin_generation().map_err(fail)?;
        effect.update_suits(record.header(), self);
        self.suits.finish_generation().map_err(fail)
    }

    fn current_generation(&self) -> Generation {
        self.suits.current_generation()
    }
}
