//! An insertion-ordered string-keyed map.
//!
//! Workflow documents are JSON objects whose key order carries meaning, so the
//! description types cannot use `HashMap`. The map is small (one entry per node
//! or edge) and lookups are linear.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
  entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
  fn default() -> Self {
    Self {
      entries: Vec::new(),
    }
  }
}

impl<V> OrderedMap<V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a value. An existing key keeps its position and gets the new value.
  pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
    let key = key.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some((_, slot)) => Some(std::mem::replace(slot, value)),
      None => {
        self.entries.push((key, value));
        None
      }
    }
  }

  pub fn get(&self, key: &str) -> Option<&V> {
    self
      .entries
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v)
  }

  pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
    self
      .entries
      .iter_mut()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v)
  }

  /// Get the value for `key`, inserting `V::default()` at the end if missing.
  pub fn entry_or_default(&mut self, key: impl Into<String>) -> &mut V
  where
    V: Default,
  {
    let key = key.into();
    let index = match self.entries.iter().position(|(k, _)| *k == key) {
      Some(index) => index,
      None => {
        self.entries.push((key, V::default()));
        self.entries.len() - 1
      }
    };
    &mut self.entries[index].1
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(k, _)| k.as_str())
  }

  pub fn values(&self) -> impl Iterator<Item = &V> {
    self.entries.iter().map(|(_, v)| v)
  }
}

impl<V> IntoIterator for OrderedMap<V> {
  type Item = (String, V);
  type IntoIter = std::vec::IntoIter<(String, V)>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut map = Self::new();
    for (k, v) in iter {
      map.insert(k, v);
    }
    map
  }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (k, v) in &self.entries {
      map.serialize_entry(k, v)?;
    }
    map.end()
  }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
  type Value = OrderedMap<V>;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a map")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
    let mut map = OrderedMap::new();
    while let Some((key, value)) = access.next_entry::<String, V>()? {
      map.insert(key, value);
    }
    Ok(map)
  }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
  }
}
