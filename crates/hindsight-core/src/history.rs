//! The history driver: folds a journal into every accumulator and remembers
//! the generation markers of each record.
//!
//! # Ingest pipeline
//!
//! ```text
//! text -> decode -> ordering check -> duplicate check -> fold into
//!   inventory, suits, loadouts, ledger -> HistoryEntry { markers }
//! ```
//!
//! The markers of entry `n` answer "what did each aggregate look like right
//! after record `n`", which is what [`History::inventory_after`] and friends
//! look up.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hindsight_events::{EquivalenceRules, EventRecord, decode};
use hindsight_state::{
    Accumulator, Catalog, CreditLedger, LedgerKey, LoadoutKey, MaterialCommodityList, StateError,
    SuitKey, SuitList, SuitLoadoutList,
};
use hindsight_store::StoreReader;
use hindsight_types::{
    EntryId, EventKind, Generation, Holding, LedgerTally, LoadoutId, Suit, SuitId, SuitLoadout,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{HindsightConfig, HistoryConfig};

/// Errors that stop a record from being folded.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The record is older than the last folded record.
    #[error("{kind} at {timestamp} arrived after a record at {previous}")]
    OutOfOrder {
        /// Kind of the rejected record.
        kind: EventKind,
        /// Its timestamp.
        timestamp: DateTime<Utc>,
        /// Timestamp of the last folded record.
        previous: DateTime<Utc>,
    },

    /// An accumulator has no generation left to fold into.
    #[error("{accumulator} has no generations left for {kind}")]
    GenerationsExhausted {
        /// Name of the exhausted accumulator.
        accumulator: &'static str,
        /// Kind of the refused record.
        kind: EventKind,
    },

    /// An accumulator rejected the fold step.
    #[error("fold failed: {source}")]
    State {
        /// The underlying accumulator error.
        #[from]
        source: StateError,
    },
}

/// Per-accumulator generations right after one record was folded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationMarkers {
    /// Inventory generation.
    pub inventory: Generation,
    /// Suit list generation.
    pub suits: Generation,
    /// Loadout list generation.
    pub loadouts: Generation,
    /// Ledger generation.
    pub ledger: Generation,
}

/// One folded record.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Identifier assigned at fold time.
    pub id: EntryId,
    /// The decoded record, shared read-only.
    pub record: Arc<EventRecord>,
    /// Accumulator generations right after this record.
    pub markers: GenerationMarkers,
}

/// What happened to an ingested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The record was folded and stored as entry `index`.
    Folded {
        /// Position of the new entry.
        index: usize,
        /// Generations right after the record.
        markers: GenerationMarkers,
    },
    /// The record repeated entry `of` and was skipped.
    Duplicate {
        /// Position of the entry it repeated.
        of: usize,
    },
}

/// Read-only handles onto every accumulator's store.
#[derive(Debug, Clone)]
pub struct HistoryReaders {
    /// Inventory store.
    pub inventory: StoreReader<String, Holding>,
    /// Suit store.
    pub suits: StoreReader<SuitKey, Suit>,
    /// Loadout store.
    pub loadouts: StoreReader<LoadoutKey, SuitLoadout>,
    /// Ledger store.
    pub ledger: StoreReader<LedgerKey, LedgerTally>,
}

/// A journal folded into versioned aggregates.
#[derive(Debug)]
pub struct History {
    inventory: MaterialCommodityList,
    suits: SuitList,
    loadouts: SuitLoadoutList,
    ledger: CreditLedger,
    entries: Vec<HistoryEntry>,
    rules: EquivalenceRules,
    settings: HistoryConfig,
    last_timestamp: Option<DateTime<Utc>>,
}

impl History {
    /// An empty history.
    pub fn new(catalog: Arc<Catalog>, config: &HindsightConfig) -> Self {
        Self {
            inventory: MaterialCommodityList::new(catalog),
            suits: SuitList::new(),
            loadouts: SuitLoadoutList::new(),
            ledger: CreditLedger::new(),
            entries: Vec::new(),
            rules: config.equivalence.rules(),
            settings: config.history,
            last_timestamp: None,
        }
    }

    /// An empty history with the standard catalog and default settings.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(Catalog::standard()), &HindsightConfig::default())
    }

    // -----------------------------------------------------------------------
    // Ingest
    // -----------------------------------------------------------------------

    /// Decode and fold one journal line.
    ///
    /// # Errors
    ///
    /// See [`History::ingest_record`].
    pub fn ingest(&mut self, text: &str) -> Result<IngestOutcome, CoreError> {
        self.ingest_record(decode(text))
    }

    /// Fold one decoded record.
    ///
    /// # Errors
    ///
    /// [`CoreError::OutOfOrder`] if ordering is enforced and the record is
    /// older than the last one folded; [`CoreError::State`] if an
    /// accumulator rejected the fold step.
    pub fn ingest_record(&mut self, record: EventRecord) -> Result<IngestOutcome, CoreError> {
        // Placeholders and unparsed timestamps carry no usable time.
        let timed = !record.is_placeholder() && record.timestamp() != DateTime::<Utc>::MIN_UTC;

        if timed && self.settings.enforce_ordering {
            if let Some(previous) = self.last_timestamp.filter(|p| *p > record.timestamp()) {
                warn!(kind = %record.kind(), %previous, timestamp = %record.timestamp(), "record out of order");
                return Err(CoreError::OutOfOrder {
                    kind: record.kind(),
                    timestamp: record.timestamp(),
                    previous,
                });
            }
        }

        if self.settings.dedupe_adjacent {
            if let Some(of) = self.duplicate_of(&record) {
                debug!(kind = %record.kind(), of, "duplicate record skipped");
                return Ok(IngestOutcome::Duplicate { of });
            }
        }

        // A record is folded into every accumulator or none.
        if let Some(accumulator) = first_exhausted(&self.generations()) {
            warn!(kind = %record.kind(), accumulator, "generation counter exhausted");
            return Err(CoreError::GenerationsExhausted {
                accumulator,
                kind: record.kind(),
            });
        }

        let markers = GenerationMarkers {
            inventory: self.inventory.process(&record)?,
            suits: self.suits.process(&record)?,
            loadouts: self.loadouts.process(&record)?,
            ledger: self.ledger.process(&record)?,
        };

        if timed {
            self.last_timestamp = Some(record.timestamp());
        }
        let index = self.entries.len();
        debug!(index, kind = %record.kind(), ?markers, "record folded");
        self.entries.push(HistoryEntry {
            id: EntryId::new(),
            record: Arc::new(record),
            markers,
        });
        Ok(IngestOutcome::Folded { index, markers })
    }

    fn generations(&self) -> [(&'static str, Generation); 4] {
        [
            (MaterialCommodityList::NAME, self.inventory.current_generation()),
            (SuitList::NAME, self.suits.current_generation()),
            (SuitLoadoutList::NAME, self.loadouts.current_generation()),
            (CreditLedger::NAME, self.ledger.current_generation()),
        ]
    }

    fn duplicate_of(&self, record: &EventRecord) -> Option<usize> {
        let index = self.entries.len().checked_sub(1)?;
        let last = self.entries.get(index)?;
        (last.record.timestamp() == record.timestamp()
            && self.rules.are_same_entry(&last.record, record))
        .then_some(index)
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    /// Every folded entry, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entry `index`.
    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Number of folded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been folded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generations after the most recent entry.
    pub fn latest_markers(&self) -> GenerationMarkers {
        self.entries.last().map(|e| e.markers).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Point-in-time views
    // -----------------------------------------------------------------------

    fn markers_after(&self, index: usize) -> Option<GenerationMarkers> {
        self.entries.get(index).map(|e| e.markers)
    }

    /// Non-empty inventory right after entry `index`.
    pub fn inventory_after(&self, index: usize) -> Option<BTreeMap<String, Arc<Holding>>> {
        let markers = self.markers_after(index)?;
        let mut items = self.inventory.snapshot(markers.inventory);
        items.retain(|_, h| h.is_non_zero());
        Some(items)
    }

    /// Owned suits right after entry `index`.
    pub fn suits_after(&self, index: usize) -> Option<BTreeMap<SuitId, Arc<Suit>>> {
        let markers = self.markers_after(index)?;
        Some(self.suits.suits(markers.suits))
    }

    /// Loadouts right after entry `index`, deleted ones included.
    pub fn loadouts_after(&self, index: usize) -> Option<BTreeMap<LoadoutId, Arc<SuitLoadout>>> {
        let markers = self.markers_after(index)?;
        Some(self.loadouts.loadouts(markers.loadouts))
    }

    /// Credit balance right after entry `index`.
    pub fn balance_after(&self, index: usize) -> Option<i64> {
        let markers = self.markers_after(index)?;
        Some(self.ledger.balance(markers.ledger))
    }

    // -----------------------------------------------------------------------
    // Accumulators
    // -----------------------------------------------------------------------

    /// The inventory accumulator.
    pub const fn inventory(&self) -> &MaterialCommodityList {
        &self.inventory
    }

    /// The suit accumulator.
    pub const fn suits(&self) -> &SuitList {
        &self.suits
    }

    /// The loadout accumulator.
    pub const fn loadouts(&self) -> &SuitLoadoutList {
        &self.loadouts
    }

    /// The credit ledger.
    pub const fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    /// Read-only store handles for query collaborators on other threads.
    pub fn readers(&self) -> HistoryReaders {
        HistoryReaders {
            inventory: self.inventory.reader(),
            suits: self.suits.reader(),
            loadouts: self.loadouts.reader(),
            ledger: self.ledger.reader(),
        }
    }
}

/// The first accumulator whose generation counter cannot advance.
fn first_exhausted(generations: &[(&'static str, Generation)]) -> Option<&'static str> {
    generations
        .iter()
        .find(|(_, g)| g.next().is_none())
        .map(|(name, _)| *name)
}

impl Default for History {
    fn default() -> Self {
        Self::with_defaults()
    }
}
