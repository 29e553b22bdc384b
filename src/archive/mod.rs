//! Content-addressed archives of containers
//!
//! Saving a container walks its trie depth-first and stores each node under
//! its content identity. Subtrees shared between saved containers are stored
//! once; loading them back through one [`Loader`] shares them again in
//! memory.
//!
//! ```
//! use champ_archive::archive::{make_loader_for, save_to_archive, to_load_archive, SaveArchive};
//! use champ_archive::Set;
//!
//! let a: Set<u32> = (0..100).collect();
//! let b = a.insert(1000);
//!
//! let (archive, id_a) = save_to_archive(&a, SaveArchive::new())?;
//! let (archive, id_b) = save_to_archive(&b, archive)?;
//!
//! let mut loader = make_loader_for(Set::new(), to_load_archive(&archive));
//! assert_eq!(loader.load(id_a)?, a);
//! assert_eq!(loader.load(id_b)?, b);
//! # Ok::<(), champ_archive::Error>(())
//! ```

mod load;
mod save;
mod transfer;

pub use load::Loader;
pub use save::SaveArchive;
pub use transfer::{from_json, to_json, LoadArchive, TransferableArchive};

use crate::container::{Map, Set};
use crate::model::{ContainerId, ContainerKind};
use crate::trie::{Champ, KeyPolicy, MapPolicy, SetPolicy};
use crate::Result;
use serde::Serialize;
use std::hash::Hash;

/// A container that can be written to and rebuilt from an archive
pub trait Archivable: Sized {
    /// What the trie stores: the element for sets, the `(key, value)` pair
    /// for maps
    type Value: Clone + Serialize;
    type Policy: KeyPolicy<Self::Value>;
    const KIND: ContainerKind;

    fn champ(&self) -> &Champ<Self::Value, Self::Policy>;
    fn from_champ(champ: Champ<Self::Value, Self::Policy>) -> Self;
}

impl<T: Hash + Eq + Clone + Serialize> Archivable for Set<T> {
    type Value = T;
    type Policy = SetPolicy;
    const KIND: ContainerKind = ContainerKind::Set;

    fn champ(&self) -> &Champ<T, SetPolicy> {
        Set::champ(self)
    }

    fn from_champ(champ: Champ<T, SetPolicy>) -> Self {
        Set::from_champ(champ)
    }
}

impl<K, V> Archivable for Map<K, V>
where
    K: Hash + Eq + Clone + Serialize,
    V: Clone + Serialize,
{
    type Value = (K, V);
    type Policy = MapPolicy;
    const KIND: ContainerKind = ContainerKind::Map;

    fn champ(&self) -> &Champ<(K, V), MapPolicy> {
        Map::champ(self)
    }

    fn from_champ(champ: Champ<(K, V), MapPolicy>) -> Self {
        Map::from_champ(champ)
    }
}

/// An empty archive able to hold containers like `container`
pub fn make_save_archive_for<C: Archivable>(_container: &C) -> SaveArchive<C::Value> {
    SaveArchive::new()
}

/// Store `container` and return the extended archive and its id
///
/// Equal containers get equal ids. Saving an already-saved container leaves
/// the archive unchanged.
pub fn save_to_archive<C: Archivable>(
    container: &C,
    archive: SaveArchive<C::Value>,
) -> Result<(SaveArchive<C::Value>, ContainerId)> {
    archive.save_champ(container.champ(), C::KIND)
}

pub fn to_transferable_form<T: Clone>(archive: &SaveArchive<T>) -> TransferableArchive<T> {
    archive.to_transferable()
}

pub fn to_load_archive<T: Clone>(archive: &SaveArchive<T>) -> LoadArchive<T> {
    archive.to_load_archive()
}

/// A loader producing containers of the same type as `empty`
pub fn make_loader_for<C: Archivable>(_empty: C, archive: LoadArchive<C::Value>) -> Loader<C> {
    Loader::new(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_save_archive_for_is_empty() {
        let set: Set<u8> = (0..10).collect();
        let archive = make_save_archive_for(&set);
        assert_eq!(archive.node_count(), 0);
        assert_eq!(archive.root_count(), 0);
    }

    #[test]
    fn test_saved_versions_share_nodes_after_load() {
        let base: Set<u32> = (0..2000).collect();
        let edited = base.insert(99_999);

        let (archive, base_id) = save_to_archive(&base, SaveArchive::new()).unwrap();
        let (archive, edited_id) = save_to_archive(&edited, archive).unwrap();

        let mut loader = make_loader_for(Set::new(), to_load_archive(&archive));
        let base_loaded = loader.load(base_id).unwrap();
        let edited_loaded = loader.load(edited_id).unwrap();
        assert_eq!(base_loaded, base);
        assert_eq!(edited_loaded, edited);

        let base_root = base_loaded.champ().root();
        let edited_root = edited_loaded.champ().root();
        let shared = edited_root
            .children()
            .iter()
            .filter(|c| base_root.children().iter().any(|b| Arc::ptr_eq(b, *c)))
            .count();
        assert!(shared > 0);
        assert!(shared + 1 >= edited_root.children().len());
    }

    #[test]
    fn test_map_roundtrip() {
        let map: Map<String, u64> = (0..300).map(|i| (format!("key-{i}"), i)).collect();
        let (archive, id) = save_to_archive(&map, SaveArchive::new()).unwrap();
        let mut loader = make_loader_for(Map::new(), to_load_archive(&archive));
        let loaded = loader.load(id).unwrap();
        assert_eq!(loaded, map);
        assert_eq!(loaded.get(&"key-42".to_string()), Some(&42));
    }

    #[test]
    fn test_json_transfer() {
        let set: Set<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let (archive, id) = save_to_archive(&set, SaveArchive::new()).unwrap();
        let json = to_json(&to_transferable_form(&archive)).unwrap();

        let mut loader = make_loader_for(Set::new(), from_json(&json).unwrap());
        assert_eq!(loader.load(id).unwrap(), set);
    }
}
