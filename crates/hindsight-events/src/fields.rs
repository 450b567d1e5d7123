//! Lenient field extraction from journal documents.
//!
//! Journal files written by different game versions disagree on which
//! fields are present and occasionally on their types. Every accessor here
//! is total: a missing or wrongly-typed field yields the type's default.

use serde_json::{Map, Value};

/// Borrowed view over the top-level object of a journal document.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Wrap a decoded JSON object.
    pub const fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// View a nested value as fields, if it is an object.
    pub const fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self { map }),
            _ => None,
        }
    }

    /// The raw value of `key`.
    pub fn get(self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    /// Whether `key` is present at all.
    pub fn has(self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// String field, or the empty string.
    pub fn str(self, key: &str) -> String {
        self.opt_str(key).map(String::from).unwrap_or_default()
    }

    /// String field, if present and a string.
    pub fn opt_str(self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Lower-cased string field, or the empty string.
    pub fn lower(self, key: &str) -> String {
        self.opt_str(key).map(str::to_lowercase).unwrap_or_default()
    }

    /// Signed integer field, or 0. Numeric strings are accepted.
    pub fn i64(self, key: &str) -> i64 {
        self.get(key).and_then(as_i64).unwrap_or(0)
    }

    /// Unsigned integer field, or 0. Numeric strings are accepted.
    pub fn u64(self, key: &str) -> u64 {
        self.get(key).and_then(as_u64).unwrap_or(0)
    }

    /// Count field, saturated into `i32`.
    pub fn count(self, key: &str) -> i32 {
        saturate_i32(self.i64(key))
    }

    /// Boolean field, or `false`.
    pub fn bool(self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Array field, or an empty slice.
    pub fn array(self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Every element of array field `key` that is an object.
    pub fn objects(self, key: &str) -> impl Iterator<Item = Fields<'a>> + use<'a> {
        self.array(key).iter().filter_map(Fields::of)
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Clamp a journal integer into the `i32` range used for item counts.
pub fn saturate_i32(value: i64) -> i32 {
    let clamped = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    i32::try_from(clamped).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_and_mistyped_fields_default() {
        let doc = json!({ "Count": "x", "Name": 4, "Flag": "yes" });
        let f = Fields::of(&doc);
        assert!(f.is_some());
        if let Some(f) = f {
            assert_eq!(f.i64("Count"), 0);
            assert_eq!(f.i64("Missing"), 0);
            assert_eq!(f.str("Name"), "");
            assert!(!f.bool("Flag"));
            assert!(f.array("Name").is_empty());
        }
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let doc = json!({ "SuitID": "1700216838981239", "Cost": " 150 " });
        if let Some(f) = Fields::of(&doc) {
            assert_eq!(f.u64("SuitID"), 1_700_216_838_981_239);
            assert_eq!(f.i64("Cost"), 150);
        }
    }

    #[test]
    fn counts_saturate() {
        let doc = json!({ "Count": 9_999_999_999_i64, "Neg": -9_999_999_999_i64 });
        if let Some(f) = Fields::of(&doc) {
            assert_eq!(f.count("Count"), i32::MAX);
            assert_eq!(f.count("Neg"), i32::MIN);
        }
    }

    #[test]
    fn objects_skips_non_objects() {
        let doc = json!({ "Inventory": [ { "Name": "gold" }, 3, "x", { "Name": "silver" } ] });
        if let Some(f) = Fields::of(&doc) {
            let names: Vec<String> = f.objects("Inventory").map(|o| o.str("Name")).collect();
            assert_eq!(names, vec!["gold", "silver"]);
        }
    }
}
