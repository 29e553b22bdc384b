//! Trie node types and bitmap helpers

use std::sync::Arc;

/// Bits of hash consumed per trie level (5 → 32-way branching)
pub const BITS_PER_LEVEL: u32 = 5;

/// Largest shift that still indexes a branch (depth 12, last level uses 4 bits)
pub const MAX_SHIFT: u32 = 60;

/// A node in the hashed trie
///
/// Nodes are shared between container versions through `Arc`. A node is only
/// ever mutated while the mutating container holds its sole reference.
#[derive(Clone, Debug)]
pub enum Node<T> {
    /// A bitmap-compressed branch
    ///
    /// Invariant: `datamap & nodemap == 0`, `values.len() == datamap.count_ones()`
    /// and `children.len() == nodemap.count_ones()`.
    Branch {
        /// Slots occupied by inline values
        datamap: u32,
        /// Slots occupied by child nodes
        nodemap: u32,
        /// Inline values, in slot order
        values: Vec<T>,
        /// Child nodes, in slot order
        children: Vec<Arc<Node<T>>>,
    },
    /// Values whose full 64-bit hashes coincide
    ///
    /// Invariant: `values.len() >= 2` once published.
    Collision {
        /// The shared hash
        hash: u64,
        /// Colliding values, compared by key equality
        values: Vec<T>,
    },
}

impl<T> Node<T> {
    /// Create an empty branch, the root of an empty container
    pub fn empty() -> Self {
        Node::Branch {
            datamap: 0,
            nodemap: 0,
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Values stored directly in this node
    pub fn values(&self) -> &[T] {
        match self {
            Node::Branch { values, .. } | Node::Collision { values, .. } => values,
        }
    }

    /// Child nodes (always empty for collision nodes)
    pub fn children(&self) -> &[Arc<Node<T>>] {
        match self {
            Node::Branch { children, .. } => children,
            Node::Collision { .. } => &[],
        }
    }

    /// The only value in this subtree, if it holds exactly one
    ///
    /// Such a subtree is never kept below a branch: the parent inlines it.
    pub fn singleton(&self) -> Option<&T> {
        match self {
            Node::Branch {
                nodemap, values, ..
            } if *nodemap == 0 && values.len() == 1 => values.first(),
            Node::Collision { values, .. } if values.len() == 1 => values.first(),
            _ => None,
        }
    }

    /// Count the values reachable from this node
    pub fn count(&self) -> usize {
        self.values().len() + self.children().iter().map(|c| c.count()).sum::<usize>()
    }
}

/// Whether `node` is referenced only by the caller
///
/// A uniquely owned node may be edited in place without any other container
/// observing the change.
pub fn is_uniquely_owned<T>(node: &Arc<Node<T>>) -> bool {
    Arc::strong_count(node) == 1 && Arc::weak_count(node) == 0
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
pub const fn fragment(hash: u64, shift: u32) -> u32 {
    ((hash >> shift) & 0x1F) as u32
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
pub const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the compact index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}
