//! Listing filters and their dependency keys.
//!
//! A [`FilterSpec`] keeps keys in the order they were set, the way a view builds
//! its query object. Two keys are derived from it:
//!
//! - [`FilterSpec::legacy_key`] serializes in insertion order. Two filters that
//!   differ only in key order produce different keys.
//! - [`FilterSpec::canonical_key`] serializes with keys sorted, so logically
//!   equal filters always compare equal. Bindings use this one.

use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    entries: Vec<(String, Value)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSpec::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries that would actually narrow a listing (non-null, non-blank,
    /// non-empty list).
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| is_active(v)).count()
    }

    pub fn is_filtered(&self) -> bool {
        self.active_count() > 0
    }

    /// Insertion-order serialization.
    pub fn legacy_key(&self) -> String {
        serialize_entries(self.entries.iter())
    }

    /// Sorted-key serialization. Nested objects are already key-sorted by
    /// `serde_json::Map`.
    pub fn canonical_key(&self) -> String {
        let mut sorted: Vec<&(String, Value)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        serialize_entries(sorted.into_iter())
    }

    /// Flatten into query parameters. Nulls are skipped, arrays become
    /// repeated parameters, nested objects are sent as JSON text.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (k, v) in &self.entries {
            match v {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        if let Some(s) = scalar(item) {
                            out.push((k.clone(), s));
                        }
                    }
                }
                other => {
                    if let Some(s) = scalar(other) {
                        out.push((k.clone(), s));
                    }
                }
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut f = FilterSpec::new();
        for (k, v) in iter {
            f.set(k, v);
        }
        f
    }
}

fn serialize_entries<'a>(entries: impl Iterator<Item = &'a (String, Value)>) -> String {
    let mut out = String::from("{");
    for (i, (k, v)) in entries.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(k.clone()).to_string());
        out.push(':');
        out.push_str(&v.to_string());
    }
    out.push('}');
    out
}

fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn is_active(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}
