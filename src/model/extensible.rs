//! Maps that admit `x-` extension keys next to their typed entries
//!
//! The Paths and Responses objects are keyed by path or status code, yet may
//! also hold specification extensions whose values have any shape.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::{Deref, DerefMut};

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

fn is_extension(key: &str) -> bool {
    key.starts_with("x-")
}

/// Typed entries plus untyped `x-` extensions
///
/// Dereferences to the typed entries, so it reads like the plain map.
#[derive(Debug, Clone, PartialEq)]
pub struct Extensible<T> {
    pub entries: BTreeMap<String, T>,
    pub extensions: BTreeMap<String, JsonValue>,
}

impl<T> Extensible<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            extensions: BTreeMap::new(),
        }
    }
}

impl<T> Default for Extensible<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Extensible<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<T> DerefMut for Extensible<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entries
    }
}

impl<'a, T> IntoIterator for &'a Extensible<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Serialize> Serialize for Extensible<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + self.extensions.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Extensible<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, JsonValue>::deserialize(deserializer)?;
        let mut map = Self::new();
        for (key, value) in raw {
            if is_extension(&key) {
                map.extensions.insert(key, value);
            } else {
                let entry = serde_json::from_value(value)
                    .map_err(|e| D::Error::custom(format!("'{}': {}", key, e)))?;
                map.entries.insert(key, entry);
            }
        }
        Ok(map)
    }
}
