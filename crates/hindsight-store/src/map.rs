//! The generational map: a per-key multi-version store with one global
//! generation counter.
//!
//! # Fold protocol
//!
//! ```text
//! begin_generation() -> put()* -> finish_generation()
//!                             \-> abandon_generation()   (no puts)
//! ```
//!
//! A generation that received no writes is rolled back so the counter only
//! ever advances for fold steps that changed something. A generation that
//! received writes is published when the step finishes (or when the next
//! step begins) and is immutable from then on.
//!
//! The writer owns the [`GenerationalMap`] and mutates through `&mut self`,
//! which makes the single-writer rule a compile-time property. Readers on
//! other threads hold a [`StoreReader`] sharing the same versions behind a
//! [`RwLock`].

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hindsight_types::Generation;
use tracing::{error, trace};

use crate::StoreError;
use crate::entry::VersionedEntry;
use crate::reader::StoreReader;

// ---------------------------------------------------------------------------
// Shared version table
// ---------------------------------------------------------------------------

/// The version table shared between the writer and its readers.
#[derive(Debug)]
pub(crate) struct Versions<K, V> {
    /// Version history per key.
    pub(crate) entries: BTreeMap<K, VersionedEntry<V>>,
    /// Highest generation whose fold step has completed.
    pub(crate) published: Generation,
}

impl<K: Ord + Clone, V> Versions<K, V> {
    const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            published: Generation::ZERO,
        }
    }

    pub(crate) fn get(&self, key: &K, generation: Generation) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .and_then(|e| e.at(generation))
            .map(|v| Arc::clone(&v.value))
    }

    pub(crate) fn snapshot_where<P>(&self, generation: Generation, predicate: P) -> BTreeMap<K, Arc<V>>
    where
        P: Fn(&V) -> bool,
    {
        self.entries
            .iter()
            .filter_map(|(k, e)| {
                let version = e.at(generation)?;
                predicate(&version.value).then(|| (k.clone(), Arc::clone(&version.value)))
            })
            .collect()
    }
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// GenerationalMap
// ---------------------------------------------------------------------------

/// Bookkeeping for the generation currently being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenGeneration {
    /// Number of `put` calls made under this generation.
    writes: u32,
}

/// Append-only, multi-key, multi-version map addressed by generation.
///
/// Every `put` stores a complete value; nothing stored is ever mutated or
/// removed. Deleted business states are expressed as new versions carrying
/// a tombstone, so history stays queryable at every generation.
#[derive(Debug)]
pub struct GenerationalMap<K, V> {
    shared: Arc<RwLock<Versions<K, V>>>,
    generation: Generation,
    open: Option<OpenGeneration>,
}

impl<K: Ord + Clone, V> GenerationalMap<K, V> {
    /// Create an empty map at [`Generation::ZERO`].
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RwLock::new(Versions::new())),
            generation: Generation::ZERO,
            open: None,
        }
    }

    /// A read-only handle that can be sent to other threads.
    pub fn reader(&self) -> StoreReader<K, V> {
        StoreReader::new(Arc::clone(&self.shared))
    }

    // -----------------------------------------------------------------------
    // Generation control
    // -----------------------------------------------------------------------

    /// Open a new generation for one fold step.
    ///
    /// A still-open generation that received writes is published first.
    ///
    /// # Errors
    ///
    /// [`StoreError::GenerationLeftOpen`] if the open generation received no
    /// writes and was never abandoned, [`StoreError::GenerationOverflow`] if
    /// the counter is exhausted.
    pub fn begin_generation(&mut self) -> Result<Generation, StoreError> {
        if let Some(open) = self.open {
            if open.writes == 0 {
                return Err(StoreError::GenerationLeftOpen {
                    generation: self.generation,
                });
            }
            self.publish();
        }

        let next = self.generation.next().ok_or(StoreError::GenerationOverflow)?;
        self.generation = next;
        self.open = Some(OpenGeneration { writes: 0 });
        trace!(generation = %next, "generation opened");
        Ok(next)
    }

    /// Roll back the open generation if nothing was written under it.
    ///
    /// Returns `true` when the generation was erased. When writes happened
    /// the call is a no-op and returns `false`; history is never erased.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoOpenGeneration`] if no generation is open.
    pub fn abandon_generation(&mut self) -> Result<bool, StoreError> {
        let open = self.open.ok_or(StoreError::NoOpenGeneration)?;
        if open.writes > 0 {
            return Ok(false);
        }

        let abandoned = self.generation;
        self.generation = abandoned.previous().ok_or(StoreError::NoOpenGeneration)?;
        self.open = None;
        trace!(generation = %abandoned, "empty generation abandoned");
        Ok(true)
    }

    /// Close the open fold step and return the resulting generation.
    ///
    /// An empty generation is abandoned; one with writes is published.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoOpenGeneration`] if no generation is open.
    pub fn finish_generation(&mut self) -> Result<Generation, StoreError> {
        if self.abandon_generation()? {
            return Ok(self.generation);
        }
        self.publish();
        Ok(self.generation)
    }

    fn publish(&mut self) {
        write_lock(&self.shared).published = self.generation;
        self.open = None;
    }

    /// The generation writes currently go to.
    pub const fn current_generation(&self) -> Generation {
        self.generation
    }

    /// Highest generation visible to readers.
    pub fn published_generation(&self) -> Generation {
        read_lock(&self.shared).published
    }

    /// Whether a fold step is in progress.
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Number of `put` calls made under the open generation.
    pub fn writes_this_generation(&self) -> u32 {
        self.open.map_or(0, |o| o.writes)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store `value` for `key` at the current generation.
    ///
    /// A second write to the same key in the same generation replaces the
    /// first. Outside a fold step a fresh generation is opened so published
    /// history is never rewritten.
    pub fn put(&mut self, key: K, value: V) {
        if self.open.is_none() {
            if let Err(err) = self.begin_generation() {
                // Only reachable on counter exhaustion: coalesce into the
                // current generation rather than drop the write.
                error!(%err, generation = %self.generation, "cannot open generation for write");
                self.open = Some(OpenGeneration { writes: 0 });
            }
        }

        let generation = self.generation;
        write_lock(&self.shared)
            .entries
            .entry(key)
            .or_default()
            .record(generation, Arc::new(value));

        if let Some(open) = self.open.as_mut() {
            open.writes = open.writes.saturating_add(1);
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The value of `key` as of `generation`, or `None` if it had not been
    /// written yet.
    pub fn get(&self, key: &K, generation: Generation) -> Option<Arc<V>> {
        read_lock(&self.shared).get(key, generation)
    }

    /// The most recent value of `key`, including writes in the open
    /// generation.
    pub fn get_latest(&self, key: &K) -> Option<Arc<V>> {
        self.get(key, self.generation)
    }

    /// Whether `key` has ever been written.
    pub fn contains_key(&self, key: &K) -> bool {
        read_lock(&self.shared).entries.contains_key(key)
    }

    /// Every key's value as of `generation`.
    pub fn snapshot(&self, generation: Generation) -> BTreeMap<K, Arc<V>> {
        self.snapshot_where(generation, |_| true)
    }

    /// Every key's value as of `generation` for which `predicate` holds.
    pub fn snapshot_where<P>(&self, generation: Generation, predicate: P) -> BTreeMap<K, Arc<V>>
    where
        P: Fn(&V) -> bool,
    {
        read_lock(&self.shared).snapshot_where(generation, predicate)
    }

    /// The latest value of every key for which `predicate` holds.
    pub fn latest_values<P>(&self, predicate: P) -> Vec<(K, Arc<V>)>
    where
        P: Fn(&V) -> bool,
    {
        self.snapshot_where(self.generation, predicate)
            .into_iter()
            .collect()
    }

    /// Number of distinct keys ever written.
    pub fn key_count(&self) -> usize {
        read_lock(&self.shared).entries.len()
    }

    /// Number of versions stored for `key`.
    pub fn version_count(&self, key: &K) -> usize {
        read_lock(&self.shared)
            .entries
            .get(key)
            .map_or(0, VersionedEntry::len)
    }
}

impl<K: Ord + Clone, V> Default for GenerationalMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    type Map = GenerationalMap<&'static str, i32>;

    fn value(map: &Map, key: &'static str, g: u32) -> Option<i32> {
        map.get(&key, Generation(g)).map(|v| *v)
    }

    #[test]
    fn new_map_is_at_generation_zero() {
        let map = Map::new();
        assert_eq!(map.current_generation(), Generation::ZERO);
        assert_eq!(map.published_generation(), Generation::ZERO);
        assert!(!map.is_open());
        assert_eq!(map.key_count(), 0);
    }

    #[test]
    fn iron_scenario() {
        let mut map = Map::new();

        map.begin_generation().unwrap();
        map.put("iron", 5);
        assert_eq!(map.finish_generation().unwrap(), Generation(1));
        assert_eq!(value(&map, "iron", 1), Some(5));

        map.begin_generation().unwrap();
        assert!(map.abandon_generation().unwrap());
        assert_eq!(map.current_generation(), Generation(1));

        map.begin_generation().unwrap();
        let latest = map.get_latest(&"iron").map_or(0, |v| *v);
        map.put("iron", (latest - 3).max(0));
        assert_eq!(map.finish_generation().unwrap(), Generation(2));
        assert_eq!(value(&map, "iron", 2), Some(2));
        assert_eq!(value(&map, "iron", 1), Some(5));
    }

    #[test]
    fn values_hold_until_next_write() {
        let mut map = Map::new();
        for (i, v) in [10, 20, 30].into_iter().enumerate() {
            map.begin_generation().unwrap();
            map.put("a", v);
            if i == 1 {
                map.put("b", 1);
            }
            map.finish_generation().unwrap();
        }
        // a written at 1, 2, 3; b only at 2.
        assert_eq!(value(&map, "a", 1), Some(10));
        assert_eq!(value(&map, "a", 2), Some(20));
        assert_eq!(value(&map, "a", 3), Some(30));
        assert_eq!(value(&map, "b", 1), None);
        assert_eq!(value(&map, "b", 3), Some(1));
        assert_eq!(value(&map, "c", 3), None);
    }

    #[test]
    fn begin_then_abandon_leaves_counter_unchanged() {
        let mut map = Map::new();
        let before = map.current_generation();
        map.begin_generation().unwrap();
        assert!(map.abandon_generation().unwrap());
        assert_eq!(map.current_generation(), before);
        assert!(!map.is_open());
    }

    #[test]
    fn abandon_after_put_is_a_noop() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        map.put("x", 1);
        assert!(!map.abandon_generation().unwrap());
        assert_eq!(map.current_generation(), Generation(1));
        assert_eq!(value(&map, "x", 1), Some(1));
    }

    #[test]
    fn abandon_without_open_generation_fails() {
        let mut map = Map::new();
        assert!(matches!(
            map.abandon_generation(),
            Err(StoreError::NoOpenGeneration)
        ));
    }

    #[test]
    fn begin_over_empty_open_generation_fails() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        assert!(matches!(
            map.begin_generation(),
            Err(StoreError::GenerationLeftOpen { generation }) if generation == Generation(1)
        ));
    }

    #[test]
    fn begin_over_written_generation_publishes_it() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        map.put("x", 1);
        assert_eq!(map.begin_generation().unwrap(), Generation(2));
        assert_eq!(map.published_generation(), Generation(1));
    }

    #[test]
    fn same_generation_writes_coalesce() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        map.put("x", 1);
        map.put("x", 2);
        map.finish_generation().unwrap();
        assert_eq!(map.version_count(&"x"), 1);
        assert_eq!(value(&map, "x", 1), Some(2));
    }

    #[test]
    fn put_outside_fold_step_opens_new_generation() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        map.put("x", 1);
        map.finish_generation().unwrap();

        map.put("x", 2);
        assert_eq!(map.current_generation(), Generation(2));
        assert_eq!(value(&map, "x", 1), Some(1));
        assert_eq!(value(&map, "x", 2), Some(2));
    }

    #[test]
    fn snapshot_applies_predicate_to_version_at_generation() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        map.put("a", 1);
        map.put("b", 0);
        map.finish_generation().unwrap();
        map.begin_generation().unwrap();
        map.put("a", 0);
        map.put("b", 4);
        map.finish_generation().unwrap();

        let first = map.snapshot_where(Generation(1), |v| *v > 0);
        assert_eq!(first.keys().copied().collect::<Vec<_>>(), vec!["a"]);
        let second = map.snapshot_where(Generation(2), |v| *v > 0);
        assert_eq!(second.keys().copied().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(map.snapshot(Generation(2)).len(), 2);
        assert!(map.snapshot(Generation::ZERO).is_empty());
    }

    #[test]
    fn latest_values_sees_open_generation() {
        let mut map = Map::new();
        map.begin_generation().unwrap();
        map.put("a", 3);
        let latest = map.latest_values(|v| *v == 3);
        assert_eq!(latest.len(), 1);
        assert_eq!(map.writes_this_generation(), 1);
    }

    #[test]
    fn dense_history_after_many_irrelevant_steps() {
        let mut map = Map::new();
        for i in 0..100 {
            map.begin_generation().unwrap();
            if i % 10 == 0 {
                map.put("k", i);
            }
            map.finish_generation().unwrap();
        }
        assert_eq!(map.current_generation(), Generation(10));
        assert_eq!(map.version_count(&"k"), 10);
        assert_eq!(value(&map, "k", 10), Some(90));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    mod properties {
        use std::collections::BTreeMap;

        use proptest::prelude::*;

        use super::*;

        /// Fold steps, each a possibly empty list of writes over four keys.
        fn arb_steps() -> impl Strategy<Value = Vec<Vec<(u8, u32)>>> {
            proptest::collection::vec(
                proptest::collection::vec((0..4u8, any::<u32>()), 0..4),
                0..24,
            )
        }

        proptest! {
            #[test]
            fn every_generation_answers_with_its_own_values(steps in arb_steps()) {
                let mut map = GenerationalMap::<u8, u32>::new();
                let mut expected: Vec<BTreeMap<u8, u32>> = vec![BTreeMap::new()];

                for writes in &steps {
                    map.begin_generation().unwrap();
                    for (key, value) in writes {
                        map.put(*key, *value);
                    }
                    let g = map.finish_generation().unwrap();

                    if !writes.is_empty() {
                        let mut next = expected.last().cloned().unwrap_or_default();
                        next.extend(writes.iter().copied());
                        expected.push(next);
                    }
                    prop_assert_eq!(
                        usize::try_from(g.value()).unwrap(),
                        expected.len().saturating_sub(1)
                    );
                }

                for (g, state) in expected.iter().enumerate() {
                    let g = Generation(u32::try_from(g).unwrap());
                    for key in 0..4u8 {
                        prop_assert_eq!(map.get(&key, g).map(|v| *v), state.get(&key).copied());
                    }
                    prop_assert_eq!(map.snapshot(g).len(), state.len());
                }
            }
        }
    }
}
