//! Load side: rebuilds containers from an archive, reusing rebuilt nodes

use super::transfer::LoadArchive;
use super::Archivable;
use crate::model::{ContainerId, NodeDescription};
use crate::trie::{fragment, index, mask, Champ, KeyPolicy, Node, BITS_PER_LEVEL, MAX_SHIFT};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A rebuilt node together with its trie position
struct Placed<T> {
    node: Arc<Node<T>>,
    /// Values below the node
    count: usize,
    shift: u32,
    /// Hash bits consumed on the way down
    prefix: u64,
}

/// Rebuilds containers of type `C` from a [`LoadArchive`]
///
/// Every node is reconstructed at most once per loader. Loading two
/// containers that were saved with a common subtree yields two containers
/// that share that subtree in memory; loading the same id twice yields
/// containers with the same root.
pub struct Loader<C: Archivable> {
    archive: LoadArchive<C::Value>,
    /// Node identity → rebuilt node and where it sits in the trie
    nodes: HashMap<ContainerId, Placed<C::Value>>,
    container: PhantomData<fn() -> C>,
}

impl<C: Archivable> Loader<C> {
    pub fn new(archive: LoadArchive<C::Value>) -> Self {
        Loader {
            archive,
            nodes: HashMap::new(),
            container: PhantomData,
        }
    }

    pub fn archive(&self) -> &LoadArchive<C::Value> {
        &self.archive
    }

    /// Hand back the archive, dropping the rebuilt-node cache
    pub fn into_archive(self) -> LoadArchive<C::Value> {
        self.archive
    }

    /// Number of nodes rebuilt so far
    pub fn cached_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Rebuild the container saved under `id`
    ///
    /// Fails with [`Error::NotFound`] if no container was saved under `id`,
    /// and with a corruption error if the archive does not describe a
    /// well-formed container.
    pub fn load(&mut self, id: ContainerId) -> Result<C> {
        let root = *self.archive.root(&id).ok_or(Error::NotFound(id))?;
        if root.kind != C::KIND {
            return Err(Error::KindMismatch {
                id,
                expected: C::KIND,
                found: root.kind,
            });
        }
        if root.identity() != id {
            return Err(self.corrupt(format!("root {} is stored under the wrong id", id.short())));
        }

        let cached_before = self.nodes.len();
        let (node, count) = self.load_node(root.node, id, 0, 0)?;
        if count != root.size {
            return Err(self.corrupt(format!(
                "root {} records {} values but its nodes hold {}",
                id.short(),
                root.size,
                count
            )));
        }

        log::debug!(
            "loaded {} {} ({} values): {} nodes rebuilt, {} cached",
            root.kind,
            id.short(),
            count,
            self.nodes.len() - cached_before,
            self.nodes.len()
        );
        Ok(C::from_champ(Champ::from_parts(node, count)))
    }

    fn load_node(
        &mut self,
        id: ContainerId,
        parent: ContainerId,
        shift: u32,
        prefix: u64,
    ) -> Result<(Arc<Node<C::Value>>, usize)> {
        if let Some(placed) = self.nodes.get(&id) {
            // Content fixes a node's position, so a reused id must sit where
            // it was first found.
            if placed.shift != shift || placed.prefix != prefix {
                return Err(self.corrupt(format!(
                    "node {} is reachable at two different trie positions",
                    id.short()
                )));
            }
            return Ok((Arc::clone(&placed.node), placed.count));
        }

        let description = self
            .archive
            .node(&id)
            .ok_or(Error::DanglingReference { parent, missing: id })?
            .clone();
        if description.identity()? != id {
            return Err(self.corrupt(format!(
                "node {} does not match its identity",
                id.short()
            )));
        }

        let (node, count) = match description {
            NodeDescription::Branch { .. } if shift > MAX_SHIFT => {
                return Err(self.corrupt(format!(
                    "branch {} lies below the last hash level",
                    id.short()
                )))
            }
            NodeDescription::Branch {
                datamap,
                nodemap,
                values,
                children,
            } => {
                if datamap & nodemap != 0
                    || values.len() != datamap.count_ones() as usize
                    || children.len() != nodemap.count_ones() as usize
                {
                    return Err(self.corrupt(format!(
                        "node {} has slots inconsistent with its bitmaps",
                        id.short()
                    )));
                }
                for (i, value) in values.iter().enumerate() {
                    let hash = hash_of::<C>(value);
                    let bit = mask(fragment(hash, shift));
                    if hash & low_bits(shift) != prefix
                        || datamap & bit == 0
                        || index(datamap, bit) != i
                    {
                        return Err(self.corrupt(format!(
                            "node {} stores a value outside its hash slot",
                            id.short()
                        )));
                    }
                }

                let mut count = values.len();
                let mut nodes = Vec::with_capacity(children.len());
                let slots = (0..32).filter(|frag| nodemap & mask(*frag) != 0);
                for (frag, child) in slots.zip(children) {
                    let below_prefix = prefix | (u64::from(frag) << shift);
                    if fragment(below_prefix, shift) != frag {
                        return Err(self.corrupt(format!(
                            "node {} uses a slot beyond the hash width",
                            id.short()
                        )));
                    }
                    let (node, below) =
                        self.load_node(child, id, shift + BITS_PER_LEVEL, below_prefix)?;
                    if below < 2 {
                        return Err(self.corrupt(format!(
                            "node {} keeps a subtree of {} value(s) that belongs inline",
                            id.short(),
                            below
                        )));
                    }
                    count += below;
                    nodes.push(node);
                }
                let node = Node::Branch {
                    datamap,
                    nodemap,
                    values,
                    children: nodes,
                };
                (node, count)
            }
            NodeDescription::Collision { .. } if shift <= MAX_SHIFT => {
                return Err(self.corrupt(format!(
                    "collision node {} sits above the last hash level",
                    id.short()
                )))
            }
            NodeDescription::Collision { values } => {
                if values.len() < 2 {
                    return Err(self.corrupt(format!(
                        "collision node {} holds fewer than two values",
                        id.short()
                    )));
                }
                if values.iter().any(|v| hash_of::<C>(v) != prefix) {
                    return Err(self.corrupt(format!(
                        "collision node {} holds a value with another hash",
                        id.short()
                    )));
                }
                let duplicate = values.iter().enumerate().any(|(i, a)| {
                    values[i + 1..]
                        .iter()
                        .any(|b| key_of::<C>(a) == key_of::<C>(b))
                });
                if duplicate {
                    return Err(self.corrupt(format!(
                        "collision node {} repeats a key",
                        id.short()
                    )));
                }
                let count = values.len();
                (
                    Node::Collision {
                        hash: prefix,
                        values,
                    },
                    count,
                )
            }
        };

        log::trace!(
            "rebuilt node {} at shift {} ({} values)",
            id.short(),
            shift,
            count
        );
        let node = Arc::new(node);
        self.nodes.insert(
            id,
            Placed {
                node: Arc::clone(&node),
                count,
                shift,
                prefix,
            },
        );
        Ok((node, count))
    }

    fn corrupt(&self, message: String) -> Error {
        log::warn!("rejecting archive: {}", message);
        Error::Corruption(message)
    }
}

fn hash_of<C: Archivable>(value: &C::Value) -> u64 {
    <C::Policy as KeyPolicy<C::Value>>::hash(value)
}

fn key_of<C: Archivable>(value: &C::Value) -> &<C::Policy as KeyPolicy<C::Value>>::Key {
    <C::Policy as KeyPolicy<C::Value>>::key(value)
}

/// Mask of the hash bits consumed above `shift`
fn low_bits(shift: u32) -> u64 {
    if shift >= u64::BITS {
        u64::MAX
    } else {
        (1 << shift) - 1
    }
}

impl<C: Archivable> fmt::Debug for Loader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("roots", &self.archive.roots.len())
            .field("nodes", &self.archive.nodes.len())
            .field("cached", &self.nodes.len())
            .finish()
    }
}
