//! CHAMP engine: lookup, path-copying insert/remove, in-place edits under
//! unique ownership, and structural equality

use super::iter::Iter;
use super::node::{fragment, index, mask, Node, BITS_PER_LEVEL, MAX_SHIFT};
use super::policy::{hash_one, KeyPolicy};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A trie root together with its element count
///
/// The same contents always produce the same node shape (canonical form): a
/// subtree below a branch always holds at least two values, and slots are
/// ordered by hash fragment. Equality and archive identities rely on this.
pub struct Champ<T, P> {
    root: Arc<Node<T>>,
    size: usize,
    policy: PhantomData<fn() -> P>,
}

// ---------------------------------------------------------------------------
// Construction & accessors (no trait bounds)
// ---------------------------------------------------------------------------

impl<T, P> Champ<T, P> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self::from_parts(Arc::new(Node::empty()), 0)
    }

    /// Wraps an existing node graph. `size` must equal `root.count()`.
    pub fn from_parts(root: Arc<Node<T>>, size: usize) -> Self {
        debug_assert_eq!(root.count(), size);
        Champ {
            root,
            size,
            policy: PhantomData,
        }
    }

    pub fn root(&self) -> &Arc<Node<T>> {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.root, self.size)
    }

    /// Returns `true` if both tries share the same root node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

impl<T, P: KeyPolicy<T>> Champ<T, P> {
    /// Returns the stored value whose key equals `key`.
    pub fn get(&self, key: &P::Key) -> Option<&T> {
        let hash = hash_one(key);
        let mut node: &Node<T> = &self.root;
        let mut shift = 0;
        loop {
            match node {
                Node::Branch {
                    datamap,
                    nodemap,
                    values,
                    children,
                } => {
                    let bit = mask(fragment(hash, shift));
                    if datamap & bit != 0 {
                        let value = &values[index(*datamap, bit)];
                        return (P::key(value) == key).then_some(value);
                    } else if nodemap & bit != 0 {
                        node = &*children[index(*nodemap, bit)];
                        shift += BITS_PER_LEVEL;
                    } else {
                        return None;
                    }
                }
                Node::Collision {
                    hash: node_hash,
                    values,
                } => {
                    if *node_hash != hash {
                        return None;
                    }
                    return values.iter().find(|v| P::key(v) == key);
                }
            }
        }
    }

    pub fn contains(&self, key: &P::Key) -> bool {
        self.get(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

impl<T: Clone, P: KeyPolicy<T>> Champ<T, P> {
    /// Returns a trie that also holds `value`, replacing any value with an
    /// equal key. Only the nodes on the root-to-leaf path are copied.
    pub fn insert(&self, value: T) -> Self {
        let mut next = self.clone();
        next.insert_mut(value);
        next
    }

    /// Returns a trie without the value keyed by `key`.
    pub fn remove(&self, key: &P::Key) -> Self {
        let mut next = self.clone();
        next.remove_mut(key);
        next
    }

    /// Inserts in place, copying only the nodes on the path that are shared
    /// with another trie. Returns `true` if the key was new.
    pub fn insert_mut(&mut self, value: T) -> bool {
        let hash = P::hash(&value);
        let inserted = insert_node::<T, P>(&mut self.root, hash, value, 0);
        if inserted {
            self.size += 1;
        }
        inserted
    }

    /// Removes in place. Returns `true` if the key was present.
    pub fn remove_mut(&mut self, key: &P::Key) -> bool {
        // Probe first so a miss never copies shared nodes.
        if !self.contains(key) {
            return false;
        }
        let removed = remove_node::<T, P>(&mut self.root, hash_one(key), key, 0);
        debug_assert!(removed);
        self.size -= 1;
        removed
    }
}

fn insert_node<T: Clone, P: KeyPolicy<T>>(
    slot: &mut Arc<Node<T>>,
    hash: u64,
    value: T,
    shift: u32,
) -> bool {
    match Arc::make_mut(slot) {
        Node::Branch {
            datamap,
            nodemap,
            values,
            children,
        } => {
            let bit = mask(fragment(hash, shift));
            if *datamap & bit != 0 {
                let pos = index(*datamap, bit);
                if P::key(&values[pos]) == P::key(&value) {
                    values[pos] = value;
                    return false;
                }
                // Different key at same position → push both into a subtree.
                let existing = values.remove(pos);
                let existing_hash = P::hash(&existing);
                let subtree = merge_values(
                    existing,
                    existing_hash,
                    value,
                    hash,
                    shift + BITS_PER_LEVEL,
                );
                *datamap &= !bit;
                *nodemap |= bit;
                children.insert(index(*nodemap, bit), Arc::new(subtree));
                true
            } else if *nodemap & bit != 0 {
                let pos = index(*nodemap, bit);
                insert_node::<T, P>(&mut children[pos], hash, value, shift + BITS_PER_LEVEL)
            } else {
                *datamap |= bit;
                values.insert(index(*datamap, bit), value);
                true
            }
        }
        Node::Collision {
            hash: node_hash,
            values,
        } => {
            debug_assert_eq!(*node_hash, hash);
            match values.iter().position(|v| P::key(v) == P::key(&value)) {
                Some(pos) => {
                    values[pos] = value;
                    false
                }
                None => {
                    values.push(value);
                    true
                }
            }
        }
    }
}

/// Builds the subtree holding two values that clash at `shift - BITS_PER_LEVEL`.
///
/// Descends until the hash fragments differ, or ends in a collision node once
/// the whole hash is used up.
fn merge_values<T>(a: T, a_hash: u64, b: T, b_hash: u64, shift: u32) -> Node<T> {
    if shift > MAX_SHIFT {
        return Node::Collision {
            hash: a_hash,
            values: vec![a, b],
        };
    }

    let fa = fragment(a_hash, shift);
    let fb = fragment(b_hash, shift);
    if fa == fb {
        let child = merge_values(a, a_hash, b, b_hash, shift + BITS_PER_LEVEL);
        Node::Branch {
            datamap: 0,
            nodemap: mask(fa),
            values: Vec::new(),
            children: vec![Arc::new(child)],
        }
    } else {
        let values = if fa < fb { vec![a, b] } else { vec![b, a] };
        Node::Branch {
            datamap: mask(fa) | mask(fb),
            nodemap: 0,
            values,
            children: Vec::new(),
        }
    }
}

fn remove_node<T: Clone, P: KeyPolicy<T>>(
    slot: &mut Arc<Node<T>>,
    hash: u64,
    key: &P::Key,
    shift: u32,
) -> bool {
    match Arc::make_mut(slot) {
        Node::Branch {
            datamap,
            nodemap,
            values,
            children,
        } => {
            let bit = mask(fragment(hash, shift));
            if *datamap & bit != 0 {
                let pos = index(*datamap, bit);
                if P::key(&values[pos]) != key {
                    return false;
                }
                values.remove(pos);
                *datamap &= !bit;
                true
            } else if *nodemap & bit != 0 {
                let pos = index(*nodemap, bit);
                let next_shift = shift + BITS_PER_LEVEL;
                if !remove_node::<T, P>(&mut children[pos], hash, key, next_shift) {
                    return false;
                }
                // Canonical form: a child left with one value moves back inline.
                if let Some(value) = children[pos].singleton() {
                    let value = value.clone();
                    children.remove(pos);
                    *nodemap &= !bit;
                    *datamap |= bit;
                    values.insert(index(*datamap, bit), value);
                }
                true
            } else {
                false
            }
        }
        Node::Collision { values, .. } => match values.iter().position(|v| P::key(v) == key) {
            Some(pos) => {
                values.remove(pos);
                true
            }
            None => false,
        },
    }
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

impl<T: PartialEq, P> Champ<T, P> {
    /// Returns `true` if both tries hold equal values.
    ///
    /// Shared subtrees are skipped by pointer; the rest is compared slot by
    /// slot, which is exact because the node shape is canonical.
    pub fn equals(&self, other: &Self) -> bool {
        self.size == other.size && nodes_equal(&self.root, &other.root)
    }
}

fn nodes_equal<T: PartialEq>(a: &Arc<Node<T>>, b: &Arc<Node<T>>) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    match (&**a, &**b) {
        (
            Node::Branch {
                datamap: da,
                nodemap: na,
                values: va,
                children: ca,
            },
            Node::Branch {
                datamap: db,
                nodemap: nb,
                values: vb,
                children: cb,
            },
        ) => {
            da == db
                && na == nb
                && va == vb
                && ca.iter().zip(cb.iter()).all(|(x, y)| nodes_equal(x, y))
        }
        (
            Node::Collision {
                hash: ha,
                values: va,
            },
            Node::Collision {
                hash: hb,
                values: vb,
            },
        ) => ha == hb && va.len() == vb.len() && va.iter().all(|v| vb.contains(v)),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<T, P> Clone for Champ<T, P> {
    fn clone(&self) -> Self {
        Champ {
            root: Arc::clone(&self.root),
            size: self.size,
            policy: PhantomData,
        }
    }
}

impl<T, P> Default for Champ<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> fmt::Debug for Champ<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Champ")
            .field("len", &self.size)
            .finish_non_exhaustive()
    }
}
