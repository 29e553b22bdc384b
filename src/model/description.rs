//! Serializable descriptions of trie nodes and container roots

use super::ContainerId;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which façade a root was saved from
///
/// Sets and maps hash different projections of their values, so a root saved
/// from one can not be rebuilt as the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Set,
    Map,
}

impl ContainerKind {
    pub fn as_byte(&self) -> u8 {
        match self {
            ContainerKind::Set => 0,
            ContainerKind::Map => 1,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Set => write!(f, "set"),
            ContainerKind::Map => write!(f, "map"),
        }
    }
}

/// Everything needed to rebuild one trie node
///
/// Children are referenced by identity, so a description never embeds another
/// node and shared subtrees are stored once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeDescription<T> {
    /// A bitmap-indexed branch
    Branch {
        /// Slots holding inline values
        datamap: u32,
        /// Slots holding child nodes
        nodemap: u32,
        /// Inline values in slot order
        values: Vec<T>,
        /// Child identities in slot order
        children: Vec<ContainerId>,
    },
    /// Values whose full hashes coincide, stored verbatim
    Collision { values: Vec<T> },
}

impl<T: Serialize> NodeDescription<T> {
    /// Compute the content identity of this description
    pub fn identity(&self) -> Result<ContainerId> {
        match self {
            NodeDescription::Branch {
                datamap,
                nodemap,
                values,
                children,
            } => branch_identity(*datamap, *nodemap, values, children),
            NodeDescription::Collision { values } => collision_identity(values),
        }
    }
}

/// Merkle fold over a branch's bitmaps, payload and child identities
pub(crate) fn branch_identity<T: Serialize>(
    datamap: u32,
    nodemap: u32,
    values: &[T],
    children: &[ContainerId],
) -> Result<ContainerId> {
    let payload = bincode::serialize(values)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"branch");
    hasher.update(&datamap.to_le_bytes());
    hasher.update(&nodemap.to_le_bytes());
    hasher.update(&payload);
    for child in children {
        hasher.update(child.as_bytes());
    }
    Ok(hasher.finalize().into())
}

/// Collision payloads are folded in sorted digest order; their value order
/// depends on insertion history.
pub(crate) fn collision_identity<T: Serialize>(values: &[T]) -> Result<ContainerId> {
    let mut digests = values
        .iter()
        .map(|v| -> Result<ContainerId> { Ok(ContainerId::digest(&bincode::serialize(v)?)) })
        .collect::<Result<Vec<_>>>()?;
    digests.sort_unstable();
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"collision");
    hasher.update(&(digests.len() as u64).to_le_bytes());
    for digest in &digests {
        hasher.update(digest.as_bytes());
    }
    Ok(hasher.finalize().into())
}

impl<T> NodeDescription<T> {
    /// Identities of the child nodes this description refers to
    pub fn children(&self) -> &[ContainerId] {
        match self {
            NodeDescription::Branch { children, .. } => children,
            NodeDescription::Collision { .. } => &[],
        }
    }
}

/// A saved container: its root node, element count and façade kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDescription {
    pub node: ContainerId,
    pub size: usize,
    pub kind: ContainerKind,
}

impl RootDescription {
    /// Compute the container id of this root
    pub fn identity(&self) -> ContainerId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"root");
        hasher.update(&[self.kind.as_byte()]);
        hasher.update(&(self.size as u64).to_le_bytes());
        hasher.update(self.node.as_bytes());
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_identity_deterministic() {
        let node = NodeDescription::Branch {
            datamap: 0b101,
            nodemap: 0,
            values: vec![1u32, 2],
            children: vec![],
        };
        assert_eq!(node.identity().unwrap(), node.clone().identity().unwrap());
    }

    #[test]
    fn test_different_branches_different_ids() {
        let n1 = NodeDescription::Branch {
            datamap: 0b11,
            nodemap: 0,
            values: vec![1u32, 2],
            children: vec![],
        };
        let n2 = NodeDescription::Branch {
            datamap: 0b101,
            nodemap: 0,
            values: vec![1u32, 2],
            children: vec![],
        };
        assert_ne!(n1.identity().unwrap(), n2.identity().unwrap());
    }

    #[test]
    fn test_collision_identity_ignores_order() {
        let a = NodeDescription::Collision {
            values: vec!["x".to_string(), "y".to_string()],
        };
        let b = NodeDescription::Collision {
            values: vec!["y".to_string(), "x".to_string()],
        };
        assert_eq!(a.identity().unwrap(), b.identity().unwrap());
    }

    #[test]
    fn test_root_identity_includes_kind() {
        let node = ContainerId::digest(b"node");
        let set = RootDescription {
            node,
            size: 1,
            kind: ContainerKind::Set,
        };
        let map = RootDescription {
            kind: ContainerKind::Map,
            ..set
        };
        assert_ne!(set.identity(), map.identity());
    }
}
