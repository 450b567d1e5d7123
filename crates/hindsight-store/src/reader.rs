//! Read-only handles onto a [`GenerationalMap`](crate::GenerationalMap).

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use hindsight_types::Generation;

use crate::map::{Versions, read_lock};

/// A cloneable, thread-safe view of a generational map.
///
/// Readers never observe a half-written fold step: every lookup is clamped
/// to the last published generation, so asking for a generation still being
/// written answers as of the one before it.
#[derive(Debug)]
pub struct StoreReader<K, V> {
    shared: Arc<RwLock<Versions<K, V>>>,
}

impl<K, V> Clone for StoreReader<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: Ord + Clone, V> StoreReader<K, V> {
    pub(crate) const fn new(shared: Arc<RwLock<Versions<K, V>>>) -> Self {
        Self { shared }
    }

    /// Highest generation whose fold step has completed.
    pub fn published_generation(&self) -> Generation {
        read_lock(&self.shared).published
    }

    /// The value of `key` as of `generation`, or as of the last published
    /// generation if `generation` is newer.
    pub fn get(&self, key: &K, generation: Generation) -> Option<Arc<V>> {
        let versions = read_lock(&self.shared);
        versions.get(key, generation.min(versions.published))
    }

    /// The value of `key` as of the last published generation.
    pub fn get_latest(&self, key: &K) -> Option<Arc<V>> {
        let versions = read_lock(&self.shared);
        versions.get(key, versions.published)
    }

    /// Every key's value as of `generation` (clamped like [`StoreReader::get`])
    /// for which `predicate` holds.
    pub fn snapshot<P>(&self, generation: Generation, predicate: P) -> BTreeMap<K, Arc<V>>
    where
        P: Fn(&V) -> bool,
    {
        let versions = read_lock(&self.shared);
        versions.snapshot_where(generation.min(versions.published), predicate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::thread;

    use crate::GenerationalMap;

    use super::*;

    #[test]
    fn reader_does_not_see_open_generation_as_latest() {
        let mut map = GenerationalMap::<u32, &str>::new();
        let reader = map.reader();

        map.begin_generation().unwrap();
        map.put(1, "first");
        map.finish_generation().unwrap();

        map.begin_generation().unwrap();
        map.put(1, "second");
        map.put(2, "half-written");
        assert_eq!(reader.get_latest(&1).as_deref(), Some(&"first"));
        assert_eq!(reader.get(&1, Generation(2)).as_deref(), Some(&"first"));
        assert_eq!(reader.get(&2, Generation(2)), None);
        assert_eq!(reader.snapshot(Generation(2), |_| true).len(), 1);

        map.finish_generation().unwrap();
        assert_eq!(reader.get_latest(&1).as_deref(), Some(&"second"));
        assert_eq!(reader.get(&2, Generation(2)).as_deref(), Some(&"half-written"));
        assert_eq!(reader.published_generation(), Generation(2));
    }

    #[test]
    fn readers_on_other_threads_see_consistent_history() {
        let mut map = GenerationalMap::<u32, u32>::new();
        let reader = map.reader();

        let handle = thread::spawn(move || {
            let mut last = Generation::ZERO;
            for _ in 0..1_000 {
                let published = reader.published_generation();
                assert!(published >= last);
                if let Some(v) = reader.get(&0, published) {
                    // Every published generation g stores value g.
                    assert_eq!(*v, published.value());
                }
                last = published;
            }
        });

        for _ in 0..200 {
            let g = map.begin_generation().unwrap();
            map.put(0, g.value());
            map.finish_generation().unwrap();
        }
        handle.join().unwrap();

        let reader = map.reader();
        let all = reader.snapshot(Generation(200), |_| true);
        assert_eq!(all.get(&0).map(|v| **v), Some(200));
    }
}
