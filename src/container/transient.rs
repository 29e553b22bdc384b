//! Transient (batch-mutable) forms of the persistent containers
//!
//! A transient owns its trie exclusively while it is being edited. Nodes it
//! holds the only reference to are updated in place; nodes still shared with
//! a persistent container are copied on first touch. `persistent(self)`
//! consumes the transient, so it can not be edited after freezing.

use super::map::Map;
use super::set::Set;
use crate::trie::{Champ, Iter, MapPolicy, SetPolicy};
use std::fmt;
use std::hash::Hash;

/// Mutable view over a [`Set`] under construction
pub struct SetTransient<T> {
    champ: Champ<T, SetPolicy>,
}

impl<T> SetTransient<T> {
    pub(crate) fn new(champ: Champ<T, SetPolicy>) -> Self {
        SetTransient { champ }
    }

    pub fn len(&self) -> usize {
        self.champ.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champ.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.champ.iter()
    }

    /// Freeze into an immutable set
    pub fn persistent(self) -> Set<T> {
        Set::from_champ(self.champ)
    }
}

impl<T: Hash + Eq> SetTransient<T> {
    pub fn count(&self, value: &T) -> usize {
        usize::from(self.champ.contains(value))
    }

    pub fn contains(&self, value: &T) -> bool {
        self.champ.contains(value)
    }
}

impl<T: Hash + Eq + Clone> SetTransient<T> {
    /// Add `value`. Returns `true` if it was not present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.champ.contains(&value) {
            return false;
        }
        self.champ.insert_mut(value)
    }

    /// Remove `value`. Returns `true` if it was present.
    pub fn erase(&mut self, value: &T) -> bool {
        self.champ.remove_mut(value)
    }
}

impl<T: Hash + Eq + Clone> Extend<T> for SetTransient<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> fmt::Debug for SetTransient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetTransient")
            .field("len", &self.champ.len())
            .finish_non_exhaustive()
    }
}

/// Mutable view over a [`Map`] under construction
pub struct MapTransient<K, V> {
    champ: Champ<(K, V), MapPolicy>,
}

impl<K, V> MapTransient<K, V> {
    pub(crate) fn new(champ: Champ<(K, V), MapPolicy>) -> Self {
        MapTransient { champ }
    }

    pub fn len(&self) -> usize {
        self.champ.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champ.is_empty()
    }

    /// Freeze into an immutable map
    pub fn persistent(self) -> Map<K, V> {
        Map::from_champ(self.champ)
    }
}

impl<K: Hash + Eq, V> MapTransient<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.champ.get(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.champ.contains(key)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> MapTransient<K, V> {
    /// Associate `value` with `key`. Returns `true` if the key was new.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.champ.insert_mut((key, value))
    }

    /// Remove `key`. Returns `true` if it was present.
    pub fn erase(&mut self, key: &K) -> bool {
        self.champ.remove_mut(key)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Extend<(K, V)> for MapTransient<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> fmt::Debug for MapTransient<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapTransient")
            .field("len", &self.champ.len())
            .finish_non_exhaustive()
    }
}
