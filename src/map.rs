//! Ordered map type for inline objects.
//!
//! [`DxMap`] wraps [`IndexMap`] so that object fields keep the order they were
//! written in. Every encoding re-emits fields in that order, which keeps
//! parse → serialize → parse cycles byte-stable.
//!
//! ## Examples
//!
//! ```rust
//! use dx_codec::{DxMap, DxValue};
//!
//! let mut map = DxMap::new();
//! map.insert("host".to_string(), DxValue::from("localhost"));
//! map.insert("port".to_string(), DxValue::from(5432));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["host", "port"]);
//! ```

use crate::DxValue;
use indexmap::IndexMap;

/// An insertion-ordered map of field names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DxMap(IndexMap<String, DxValue>);

impl DxMap {
    /// Creates an empty `DxMap`.
    #[must_use]
    pub fn new() -> Self {
        DxMap(IndexMap::new())
    }

    /// Creates an empty `DxMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        DxMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field. An existing field keeps its position and its old value
    /// is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dx_codec::{DxMap, DxValue};
    ///
    /// let mut map = DxMap::new();
    /// assert!(map.insert("key".to_string(), DxValue::from(1)).is_none());
    /// assert!(map.insert("key".to_string(), DxValue::from(2)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: DxValue) -> Option<DxValue> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DxValue> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the field names, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, DxValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, DxValue> {
        self.0.values()
    }

    /// Returns a mutable iterator over the values, in insertion order.
    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, String, DxValue> {
        self.0.values_mut()
    }

    /// Returns an iterator over the fields, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, DxValue> {
        self.0.iter()
    }
}

impl IntoIterator for DxMap {
    type Item = (String, DxValue);
    type IntoIter = indexmap::map::IntoIter<String, DxValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DxMap {
    type Item = (&'a String, &'a DxValue);
    type IntoIter = indexmap::map::Iter<'a, String, DxValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, DxValue)> for DxMap {
    fn from_iter<T: IntoIterator<Item = (String, DxValue)>>(iter: T) -> Self {
        DxMap(IndexMap::from_iter(iter))
    }
}

impl From<IndexMap<String, DxValue>> for DxMap {
    fn from(map: IndexMap<String, DxValue>) -> Self {
        DxMap(map)
    }
}

impl From<DxMap> for IndexMap<String, DxValue> {
    fn from(map: DxMap) -> Self {
        map.0
    }
}
