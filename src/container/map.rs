//! Immutable hash map

use super::transient::MapTransient;
use crate::trie::{Champ, Iter, MapPolicy};
use std::fmt;
use std::hash::Hash;

/// Immutable map from keys to values
///
/// Stored as `(key, value)` pairs in the same trie as [`Set`](super::Set),
/// hashed and compared by key only.
pub struct Map<K, V> {
    champ: Champ<(K, V), MapPolicy>,
}

impl<K, V> Map<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Map {
            champ: Champ::new(),
        }
    }

    pub(crate) fn from_champ(champ: Champ<(K, V), MapPolicy>) -> Self {
        Map { champ }
    }

    pub(crate) fn champ(&self) -> &Champ<(K, V), MapPolicy> {
        &self.champ
    }

    /// Number of entries in the map
    pub fn len(&self) -> usize {
        self.champ.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champ.is_empty()
    }

    /// Iterate `(key, value)` pairs in an unspecified but stable order
    pub fn iter(&self) -> MapIter<'_, K, V> {
        MapIter {
            inner: self.champ.iter(),
        }
    }

    /// Whether both maps share the same root node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.champ.ptr_eq(&other.champ)
    }
}

impl<K: Hash + Eq, V> Map<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.champ.get(key).map(|(_, v)| v)
    }

    /// Returns `1` when `key` is in the map, `0` otherwise
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.contains_key(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.champ.contains(key)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Map<K, V> {
    /// Returns a map where `key` is associated with `value`
    pub fn insert(&self, key: K, value: V) -> Self {
        Map {
            champ: self.champ.insert((key, value)),
        }
    }

    /// Returns a map without `key`
    ///
    /// If `key` is not present the same map is returned.
    pub fn erase(&self, key: &K) -> Self {
        if !self.contains_key(key) {
            return self.clone();
        }
        Map {
            champ: self.champ.remove(key),
        }
    }

    /// Returns a map where the value at `key` is replaced by `f` applied to
    /// the current value, or to `V::default()` when the key is absent
    pub fn update<F>(&self, key: K, f: F) -> Self
    where
        V: Default,
        F: FnOnce(V) -> V,
    {
        let current = self.get(&key).cloned().unwrap_or_default();
        self.insert(key, f(current))
    }

    /// Returns a transient sharing this map's nodes
    pub fn transient(&self) -> MapTransient<K, V> {
        MapTransient::new(self.champ.clone())
    }

    /// Like [`transient`](Self::transient), but hands over this map's
    /// reference so unshared nodes are edited in place.
    pub fn into_transient(self) -> MapTransient<K, V> {
        MapTransient::new(self.champ)
    }
}

/// Iterator over `(&K, &V)` pairs of a [`Map`]
pub struct MapIter<'a, K, V> {
    inner: Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for MapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for MapIter<'_, K, V> {}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Map {
            champ: self.champ.clone(),
        }
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.champ.equals(&other.champ)
    }
}

impl<K: Eq, V: Eq> Eq for Map<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq + Clone, V: Clone> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = Map::new().into_transient();
        transient.extend(iter);
        transient.persistent()
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = MapIter<'a, K, V>;

    fn into_iter(self) -> MapIter<'a, K, V> {
        self.iter()
    }
}
