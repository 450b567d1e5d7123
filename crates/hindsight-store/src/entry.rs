//! The version history of a single key.
//!
//! A [`VersionedEntry`] is an ordered list of `(generation, value)` pairs
//! with strictly increasing generations. Point-in-time lookups are a binary
//! search over that list.

use std::sync::Arc;

use hindsight_types::Generation;

/// One stored version of a value.
#[derive(Debug)]
pub struct Version<V> {
    /// The generation this version was written at.
    pub generation: Generation,
    /// The value. Never mutated once stored.
    pub value: Arc<V>,
}

impl<V> Clone for Version<V> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            value: Arc::clone(&self.value),
        }
    }
}

/// Ordered version history for one key.
#[derive(Debug)]
pub struct VersionedEntry<V> {
    versions: Vec<Version<V>>,
}

impl<V> VersionedEntry<V> {
    /// An entry with no versions.
    pub const fn new() -> Self {
        Self {
            versions: Vec::new(),
        }
    }

    /// Record `value` at `generation`.
    ///
    /// A write at the same generation as the most recent version replaces
    /// it; anything else appends. Returns `true` when a version was replaced.
    ///
    /// Callers guarantee `generation` is not older than the last version.
    pub fn record(&mut self, generation: Generation, value: Arc<V>) -> bool {
        if let Some(last) = self.versions.last_mut() {
            if last.generation == generation {
                last.value = value;
                return true;
            }
            debug_assert!(
                last.generation < generation,
                "versions must be recorded in generation order"
            );
        }
        self.versions.push(Version { generation, value });
        false
    }

    /// The last version written at or before `generation`.
    pub fn at(&self, generation: Generation) -> Option<&Version<V>> {
        let after = self.versions.partition_point(|v| v.generation <= generation);
        after.checked_sub(1).and_then(|i| self.versions.get(i))
    }

    /// Number of stored versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether no version has been stored.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl<V> Default for VersionedEntry<V> {
    fn default() -> Self {
        Self::new()
    }
}
