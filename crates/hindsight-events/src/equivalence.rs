//! Structural equivalence of journal documents.
//!
//! Tools that enrich journal files add private annotation keys (an `EDD`
//! prefix, `StarPosFromEDSM`). Two records are the same entry when their
//! documents are equal once those keys are ignored.

use serde_json::Value;

use crate::record::EventRecord;

/// Which top-level keys are ignored when comparing documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceRules {
    private_key_prefixes: Vec<String>,
    private_keys: Vec<String>,
}

impl EquivalenceRules {
    /// Rules ignoring keys that start with any of `prefixes` or equal any of
    /// `keys`.
    pub const fn new(private_key_prefixes: Vec<String>, private_keys: Vec<String>) -> Self {
        Self {
            private_key_prefixes,
            private_keys,
        }
    }

    /// Whether `key` is a private annotation.
    pub fn is_private(&self, key: &str) -> bool {
        self.private_key_prefixes
            .iter()
            .any(|p| key.starts_with(p.as_str()))
            || self.private_keys.iter().any(|k| k == key)
    }

    /// A copy of `document` without private top-level keys.
    pub fn strip_private(&self, document: &Value) -> Value {
        match document {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(k, _)| !self.is_private(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Deep equality of two documents, ignoring private top-level keys.
    ///
    /// Object key order never matters. Arrays and scalars compare exactly.
    /// Neither input is modified or copied.
    pub fn are_same_document(&self, a: &Value, b: &Value) -> bool {
        let (Value::Object(a), Value::Object(b)) = (a, b) else {
            return a == b;
        };
        let visible_b = b.keys().filter(|k| !self.is_private(k)).count();
        let mut visible_a = 0_usize;
        for (key, value) in a.iter().filter(|(k, _)| !self.is_private(k)) {
            if b.get(key) != Some(value) {
                return false;
            }
            visible_a = visible_a.saturating_add(1);
        }
        visible_a == visible_b
    }

    /// Whether two records describe the same journal entry.
    pub fn are_same_entry(&self, a: &EventRecord, b: &EventRecord) -> bool {
        self.are_same_document(a.document(), b.document())
    }
}

impl Default for EquivalenceRules {
    fn default() -> Self {
        Self::new(vec![String::from("EDD")], vec![String::from("StarPosFromEDSM")])
    }
}
