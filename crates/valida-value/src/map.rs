//! Insertion-ordered mapping keyed by values

use crate::value::{Value, I64_UPPER};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::fmt;

/// Hashable projection of a scalar value
///
/// Two values with a key are equal exactly when their keys are equal.
/// Integral floats share the key of the equal integer. Non-integral floats,
/// NaN and containers have no key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Null,
    Bool(bool),
    Integer(i64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Hashable key of a scalar, `None` for values only comparable by equality
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    #[must_use]
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Null => Some(HashKey::Null),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::Integer(i) => Some(HashKey::Integer(*i)),
            Value::Float(x) if x.trunc() == *x && *x >= -I64_UPPER && *x < I64_UPPER => {
                Some(HashKey::Integer(*x as i64))
            }
            Value::String(s) => Some(HashKey::String(s.clone())),
            Value::Bytes(b) => Some(HashKey::Bytes(b.clone())),
            Value::Date(d) => Some(HashKey::Date(*d)),
            Value::Time(t) => Some(HashKey::Time(*t)),
            Value::DateTime(dt) => Some(HashKey::DateTime(*dt)),
            Value::Float(_) | Value::List(_) | Value::Tuple(_) | Value::Map(_) => None,
        }
    }
}

/// A key/value mapping that preserves insertion order
///
/// Keys are arbitrary values compared with [`Value`] equality, so integer,
/// string and tuple keys can coexist. Keys with a [`HashKey`] are found
/// through a hash index; the rest are found by scanning. Equality between
/// two maps ignores order.
#[derive(Clone, Default)]
pub struct Map {
    entries: Vec<(Value, Value)>,
    index: HashMap<HashKey, usize>,
}

impl Map {
    /// Create a new empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &Value) -> Option<usize> {
        match key.hash_key() {
            Some(hashed) => self.index.get(&hashed).copied(),
            None => self.entries.iter().position(|(k, _)| k == key),
        }
    }

    /// Get the value stored under `key`
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Get the value stored under a string key
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.index
            .get(&HashKey::String(key.to_string()))
            .map(|idx| &self.entries[*idx].1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Check whether a string key is present
    #[must_use]
    pub fn contains_str(&self, key: &str) -> bool {
        self.get_str(key).is_some()
    }

    /// Insert an entry, replacing the value of an existing equal key in place
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(idx) = self.position(&key) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        if let Some(hashed) = key.hash_key() {
            self.index.insert(hashed, self.entries.len());
        }
        self.entries.push((key, value));
        None
    }

    /// Remove an entry, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let idx = self.position(key)?;
        let (removed_key, value) = self.entries.remove(idx);
        if let Some(hashed) = removed_key.hash_key() {
            self.index.remove(&hashed);
        }
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Map::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}

impl Extend<(Value, Value)> for Map {
    fn extend<I: IntoIterator<Item = (Value, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
