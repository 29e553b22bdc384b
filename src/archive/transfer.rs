//! Transferable and load-side archive forms, and the JSON codec

use crate::model::{ContainerId, NodeDescription, RootDescription};
use crate::{Error, Result, VERSION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// An archive in the shape handed to an external encoder
///
/// Ordered maps keep the encoded form deterministic for identical archives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferableArchive<T> {
    /// Archive format version
    pub version: u32,
    /// Node identity → node description
    pub nodes: BTreeMap<ContainerId, NodeDescription<T>>,
    /// Container id → saved root
    pub roots: BTreeMap<ContainerId, RootDescription>,
}

/// An archive ready to be consumed by a [`Loader`](super::Loader)
#[derive(Clone, Debug)]
pub struct LoadArchive<T> {
    pub(crate) nodes: HashMap<ContainerId, NodeDescription<T>>,
    pub(crate) roots: HashMap<ContainerId, RootDescription>,
}

impl<T> LoadArchive<T> {
    pub fn node(&self, id: &ContainerId) -> Option<&NodeDescription<T>> {
        self.nodes.get(id)
    }

    pub fn root(&self, id: &ContainerId) -> Option<&RootDescription> {
        self.roots.get(id)
    }

    /// Number of distinct nodes stored
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of every saved container, sorted
    pub fn root_ids(&self) -> Vec<ContainerId> {
        let mut ids: Vec<_> = self.roots.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Reshape back into the transferable form
    pub fn into_transferable(self) -> TransferableArchive<T> {
        TransferableArchive {
            version: VERSION,
            nodes: self.nodes.into_iter().collect(),
            roots: self.roots.into_iter().collect(),
        }
    }
}

impl<T> TryFrom<TransferableArchive<T>> for LoadArchive<T> {
    type Error = Error;

    fn try_from(archive: TransferableArchive<T>) -> Result<Self> {
        if archive.version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: archive.version,
            });
        }
        Ok(LoadArchive {
            nodes: archive.nodes.into_iter().collect(),
            roots: archive.roots.into_iter().collect(),
        })
    }
}

/// Encode an archive as JSON
pub fn to_json<T: Serialize>(archive: &TransferableArchive<T>) -> Result<String> {
    Ok(serde_json::to_string(archive)?)
}

/// Decode a JSON archive straight into its load-side form
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<LoadArchive<T>> {
    let archive: TransferableArchive<T> = serde_json::from_str(json)?;
    LoadArchive::try_from(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContainerKind;

    fn sample() -> TransferableArchive<String> {
        let leaf = NodeDescription::Branch {
            datamap: 0b1,
            nodemap: 0,
            values: vec!["hello".to_string()],
            children: vec![],
        };
        let node = leaf.identity().unwrap();
        let root = RootDescription {
            node,
            size: 1,
            kind: ContainerKind::Set,
        };
        TransferableArchive {
            version: VERSION,
            nodes: [(node, leaf)].into_iter().collect(),
            roots: [(root.identity(), root)].into_iter().collect(),
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let archive = sample();
        let json = to_json(&archive).unwrap();
        let loaded: LoadArchive<String> = from_json(&json).unwrap();
        assert_eq!(loaded.node_count(), 1);
        assert_eq!(loaded.into_transferable(), archive);
    }

    #[test]
    fn test_json_is_deterministic() {
        assert_eq!(to_json(&sample()).unwrap(), to_json(&sample()).unwrap());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut archive = sample();
        archive.version = VERSION + 1;
        let json = to_json(&archive).unwrap();
        let err = from_json::<String>(&json).unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = from_json::<String>("{\"version\": 1").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
