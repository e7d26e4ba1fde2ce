//! Flat label → value records and first-non-empty-wins merging.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Extracted key-value pairs for one RC number, in discovery order.
///
/// Keys are the labels as found on the page; synonymous labels stay separate
/// keys. A key, once set, is never overwritten and values are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value` unless the key already holds a value.
    ///
    /// Returns `true` when the value was stored. Empty values are ignored.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return false;
        }
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    /// Look up the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fold another record in, keeping existing values.
    pub fn absorb(&mut self, other: &Record) {
        for (k, v) in other.iter() {
            self.insert_if_absent(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert_if_absent(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Combine records left to right; each key keeps the first non-empty value.
pub fn merge(records: &[Record]) -> Record {
    let mut merged = Record::new();
    for record in records {
        merged.absorb(record);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_first_value_wins() {
        let merged = merge(&[rec(&[("A", "1")]), rec(&[("A", "2")])]);
        assert_eq!(merged, rec(&[("A", "1")]));
    }

    #[test]
    fn test_empty_value_does_not_block() {
        let merged = merge(&[rec(&[("A", "")]), rec(&[("A", "2")])]);
        assert_eq!(merged.get("A"), Some("2"));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_merge_keeps_disjoint_keys_in_order() {
        let merged = merge(&[rec(&[("A", "1"), ("B", "2")]), rec(&[("C", "3"), ("A", "9")])]);
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(merged.get("A"), Some("1"));
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        assert!(merge(&[]).is_empty());
        assert!(merge(&[Record::new(), Record::new()]).is_empty());
    }

    #[test]
    fn test_insert_if_absent() {
        let mut r = Record::new();
        assert!(r.insert_if_absent("Owner Name", "John Doe"));
        assert!(!r.insert_if_absent("Owner Name", "Jane Roe"));
        assert!(!r.insert_if_absent("Fuel", ""));
        assert_eq!(r.get("Owner Name"), Some("John Doe"));
        assert!(!r.contains_key("Fuel"));
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let r = rec(&[("Owner Name", "John Doe"), ("Fuel", "PETROL")]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"Owner Name":"John Doe","Fuel":"PETROL"}"#);
    }
}
