//! Lazy depth-first iteration over trie values

use super::node::Node;
use std::slice;

/// Iterator over references to the values of a trie
///
/// Walks the graph lazily with an explicit stack; the order is fixed by the
/// trie shape, so it is stable for a given container instance.
pub struct Iter<'a, T> {
    pending: Vec<&'a Node<T>>,
    values: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: &'a Node<T>, size: usize) -> Self {
        Iter {
            pending: root.children().iter().rev().map(|child| &**child).collect(),
            values: root.values().iter(),
            remaining: size,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(value) = self.values.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(value);
            }
            let node = self.pending.pop()?;
            self.pending
                .extend(node.children().iter().rev().map(|child| &**child));
            self.values = node.values().iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            pending: self.pending.clone(),
            values: self.values.clone(),
            remaining: self.remaining,
        }
    }
}
