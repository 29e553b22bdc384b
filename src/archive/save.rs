//! Save side: turns container graphs into deduplicated node descriptions

use super::transfer::{LoadArchive, TransferableArchive};
use crate::model::{
    branch_identity, collision_identity, ContainerId, ContainerKind, NodeDescription,
    RootDescription,
};
use crate::trie::{Champ, Node};
use crate::{Result, VERSION};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Accumulates saved containers
///
/// Nodes are keyed by content identity, so a subtree reachable from several
/// saved containers is stored once. The archive keeps no reference to the
/// saved graphs: a container saved here stays uniquely owned by its caller.
#[derive(Clone)]
pub struct SaveArchive<T> {
    nodes: HashMap<ContainerId, NodeDescription<T>>,
    roots: HashMap<ContainerId, RootDescription>,
}

impl<T> SaveArchive<T> {
    /// Create an empty archive
    pub fn new() -> Self {
        SaveArchive {
            nodes: HashMap::new(),
            roots: HashMap::new(),
        }
    }

    /// Number of distinct nodes stored
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct containers saved
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn contains_root(&self, id: &ContainerId) -> bool {
        self.roots.contains_key(id)
    }

    pub fn root(&self, id: &ContainerId) -> Option<&RootDescription> {
        self.roots.get(id)
    }

    pub fn node(&self, id: &ContainerId) -> Option<&NodeDescription<T>> {
        self.nodes.get(id)
    }
}

impl<T: Clone> SaveArchive<T> {
    /// Snapshot into the ordered, encoder-facing form
    pub fn to_transferable(&self) -> TransferableArchive<T> {
        TransferableArchive {
            version: VERSION,
            nodes: self
                .nodes
                .iter()
                .map(|(id, node)| (*id, node.clone()))
                .collect(),
            roots: self.roots.iter().map(|(id, root)| (*id, *root)).collect(),
        }
    }

    /// Snapshot into the form a loader consumes
    pub fn to_load_archive(&self) -> LoadArchive<T> {
        LoadArchive {
            nodes: self.nodes.clone(),
            roots: self.roots.clone(),
        }
    }
}

impl<T: Clone + Serialize> SaveArchive<T> {
    /// Store `champ` and return the archive with its container id
    ///
    /// Saving a container that is already present leaves the archive
    /// unchanged and returns the same id.
    pub(crate) fn save_champ<P>(
        mut self,
        champ: &Champ<T, P>,
        kind: ContainerKind,
    ) -> Result<(Self, ContainerId)> {
        let nodes_before = self.nodes.len();
        let mut walked = 0;

        let node = self.save_node(champ.root(), &mut walked)?;
        let root = RootDescription {
            node,
            size: champ.len(),
            kind,
        };
        let id = root.identity();
        self.roots.entry(id).or_insert(root);

        log::debug!(
            "saved {} {} ({} values): {} nodes walked, {} new, {} total",
            kind,
            id.short(),
            champ.len(),
            walked,
            self.nodes.len() - nodes_before,
            self.nodes.len()
        );
        Ok((self, id))
    }

    fn save_node(&mut self, node: &Node<T>, walked: &mut usize) -> Result<ContainerId> {
        *walked += 1;
        let id = match node {
            Node::Branch {
                datamap,
                nodemap,
                values,
                children,
            } => {
                let children = children
                    .iter()
                    .map(|child| self.save_node(child, walked))
                    .collect::<Result<Vec<_>>>()?;
                let id = branch_identity(*datamap, *nodemap, values, &children)?;
                if !self.nodes.contains_key(&id) {
                    self.nodes.insert(
                        id,
                        NodeDescription::Branch {
                            datamap: *datamap,
                            nodemap: *nodemap,
                            values: values.clone(),
                            children,
                        },
                    );
                }
                id
            }
            Node::Collision { values, .. } => {
                let id = collision_identity(values)?;
                if !self.nodes.contains_key(&id) {
                    self.nodes.insert(
                        id,
                        NodeDescription::Collision {
                            values: values.clone(),
                        },
                    );
                }
                id
            }
        };

        Ok(id)
    }
}

impl<T> Default for SaveArchive<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<LoadArchive<T>> for SaveArchive<T> {
    /// Resume saving into a previously written archive
    fn from(archive: LoadArchive<T>) -> Self {
        SaveArchive {
            nodes: archive.nodes,
            roots: archive.roots,
        }
    }
}

impl<T> fmt::Debug for SaveArchive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveArchive")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{is_uniquely_owned, SetPolicy};
    use std::sync::Arc;

    type IntChamp = Champ<u32, SetPolicy>;

    fn build(range: std::ops::Range<u32>) -> IntChamp {
        let mut champ = IntChamp::new();
        for i in range {
            champ.insert_mut(i);
        }
        champ
    }

    #[test]
    fn test_save_empty() {
        let (archive, id) = SaveArchive::new()
            .save_champ(&IntChamp::new(), ContainerKind::Set)
            .unwrap();
        assert_eq!(archive.node_count(), 1);
        assert_eq!(archive.root(&id).unwrap().size, 0);
    }

    #[test]
    fn test_resave_is_idempotent() {
        let champ = build(0..500);
        let (archive, first) = SaveArchive::new()
            .save_champ(&champ, ContainerKind::Set)
            .unwrap();
        let nodes = archive.node_count();
        let (archive, second) = archive.save_champ(&champ, ContainerKind::Set).unwrap();
        assert_eq!(first, second);
        assert_eq!(archive.node_count(), nodes);
        assert_eq!(archive.root_count(), 1);
    }

    #[test]
    fn test_equal_contents_share_id() {
        let a = build(0..300);
        let mut b = IntChamp::new();
        for i in (0..300).rev() {
            b.insert_mut(i);
        }
        assert!(!a.ptr_eq(&b));

        let (archive, id_a) = SaveArchive::new().save_champ(&a, ContainerKind::Set).unwrap();
        let nodes = archive.node_count();
        let (archive, id_b) = archive.save_champ(&b, ContainerKind::Set).unwrap();
        assert_eq!(id_a, id_b);
        assert_eq!(archive.node_count(), nodes);
    }

    #[test]
    fn test_modified_version_adds_only_path() {
        let base = build(0..2000);
        let edited = base.insert(5000);

        let (archive, _) = SaveArchive::new()
            .save_champ(&base, ContainerKind::Set)
            .unwrap();
        let nodes = archive.node_count();
        let (archive, _) = archive.save_champ(&edited, ContainerKind::Set).unwrap();
        let added = archive.node_count() - nodes;
        assert!(added >= 1);
        assert!(added <= 8, "only the rewritten path is new, got {added}");
        assert_eq!(archive.root_count(), 2);
    }

    #[test]
    fn test_kind_changes_id() {
        let champ = build(0..10);
        let (archive, as_set) = SaveArchive::new()
            .save_champ(&champ, ContainerKind::Set)
            .unwrap();
        let (archive, as_map) = archive.save_champ(&champ, ContainerKind::Map).unwrap();
        assert_ne!(as_set, as_map);
        assert_eq!(archive.root_count(), 2);
    }

    #[test]
    fn test_transferable_snapshot() {
        let (archive, id) = SaveArchive::new()
            .save_champ(&build(0..100), ContainerKind::Set)
            .unwrap();
        let transferable = archive.to_transferable();
        assert_eq!(transferable.version, VERSION);
        assert_eq!(transferable.nodes.len(), archive.node_count());
        assert!(transferable.roots.contains_key(&id));
    }

    #[test]
    fn test_saved_container_stays_uniquely_owned() {
        let mut champ = build(0..1000);
        let (archive, before) = SaveArchive::new()
            .save_champ(&champ, ContainerKind::Set)
            .unwrap();
        assert!(is_uniquely_owned(champ.root()));

        // The archive pins nothing, so the edit happens in place.
        let root = Arc::as_ptr(champ.root());
        champ.insert_mut(5000);
        assert_eq!(Arc::as_ptr(champ.root()), root);

        let (archive, after) = archive.save_champ(&champ, ContainerKind::Set).unwrap();
        assert_ne!(before, after);
        assert_eq!(archive.root_count(), 2);
    }

    #[test]
    fn test_resume_from_load_archive() {
        let (archive, id) = SaveArchive::new()
            .save_champ(&build(0..100), ContainerKind::Set)
            .unwrap();
        let resumed = SaveArchive::from(archive.to_load_archive());
        assert!(resumed.contains_root(&id));
        assert_eq!(resumed.node_count(), archive.node_count());
    }
}
