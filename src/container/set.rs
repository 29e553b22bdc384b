//! Immutable hash set

use super::transient::SetTransient;
use crate::trie::{Champ, Iter, SetPolicy};
use std::fmt;
use std::hash::Hash;

/// Immutable set representing an unordered bag of values
///
/// Every mutator returns a new set and leaves the receiver untouched; the two
/// versions share all nodes not on the modified path. Cloning is O(1).
pub struct Set<T> {
    champ: Champ<T, SetPolicy>,
}

impl<T> Set<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Set {
            champ: Champ::new(),
        }
    }

    pub(crate) fn from_champ(champ: Champ<T, SetPolicy>) -> Self {
        Set { champ }
    }

    pub(crate) fn champ(&self) -> &Champ<T, SetPolicy> {
        &self.champ
    }

    /// Number of values in the set
    pub fn len(&self) -> usize {
        self.champ.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champ.is_empty()
    }

    /// Iterate the values; the order is unspecified but stable for this set
    pub fn iter(&self) -> Iter<'_, T> {
        self.champ.iter()
    }

    /// Whether both sets share the same root node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.champ.ptr_eq(&other.champ)
    }
}

impl<T: Hash + Eq> Set<T> {
    /// Returns `1` when `value` is in the set, `0` otherwise
    pub fn count(&self, value: &T) -> usize {
        usize::from(self.contains(value))
    }

    pub fn contains(&self, value: &T) -> bool {
        self.champ.contains(value)
    }

    /// The stored value equal to `value`, if any
    pub fn get(&self, value: &T) -> Option<&T> {
        self.champ.get(value)
    }
}

impl<T: Hash + Eq + Clone> Set<T> {
    /// Returns a set containing `value`
    ///
    /// If `value` is already present the same set is returned.
    pub fn insert(&self, value: T) -> Self {
        if self.contains(&value) {
            return self.clone();
        }
        Set {
            champ: self.champ.insert(value),
        }
    }

    /// Returns a set without `value`
    ///
    /// If `value` is not present the same set is returned.
    pub fn erase(&self, value: &T) -> Self {
        if !self.contains(value) {
            return self.clone();
        }
        Set {
            champ: self.champ.remove(value),
        }
    }

    /// Returns a transient sharing this set's nodes
    ///
    /// The first edit of each shared node copies it, so `self` is never
    /// affected.
    pub fn transient(&self) -> SetTransient<T> {
        SetTransient::new(self.champ.clone())
    }

    /// Like [`transient`](Self::transient), but hands over this set's
    /// reference so unshared nodes are edited in place.
    pub fn into_transient(self) -> SetTransient<T> {
        SetTransient::new(self.champ)
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<T> Clone for Set<T> {
    fn clone(&self) -> Self {
        Set {
            champ: self.champ.clone(),
        }
    }
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for Set<T> {
    fn eq(&self, other: &Self) -> bool {
        self.champ.equals(&other.champ)
    }
}

impl<T: Eq> Eq for Set<T> {}

impl<T: fmt::Debug> fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Hash + Eq + Clone> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = Set::new().into_transient();
        transient.extend(iter);
        transient.persistent()
    }
}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
