//! # champ_archive
//!
//! Persistent hash sets and maps on a compressed hash-array mapped prefix
//! trie (CHAMP), with content-addressed archives that preserve structural
//! sharing across save and load.
//!
//! ## Core Concepts
//!
//! - **Containers**: [`Set`] and [`Map`] never change after construction;
//!   every update returns a new version sharing all untouched nodes
//! - **Transients**: [`SetTransient`] and [`MapTransient`] batch many edits,
//!   mutating uniquely-owned nodes in place
//! - **Archives**: saved nodes are keyed by a BLAKE3 identity of their
//!   content, so shared subtrees are stored once and rebuilt once
//!
//! ## Example
//!
//! ```
//! use champ_archive::archive::{make_loader_for, save_to_archive, to_load_archive, SaveArchive};
//! use champ_archive::Set;
//!
//! let hello = Set::new().insert("hello".to_string());
//! let (archive, id) = save_to_archive(&hello, SaveArchive::new())?;
//!
//! let mut loader = make_loader_for(Set::new(), to_load_archive(&archive));
//! assert_eq!(loader.load(id)?, hello);
//! # Ok::<(), champ_archive::Error>(())
//! ```

pub mod archive;
pub mod container;
pub mod model;
pub mod store;
pub mod trie;

mod error;

pub use archive::{Archivable, LoadArchive, Loader, SaveArchive, TransferableArchive};
pub use container::{Map, MapTransient, Set, SetTransient};
pub use error::{Error, Result};
pub use model::{ContainerId, ContainerKind};
pub use store::ArchiveFormat;

/// Archive format version
pub const VERSION: u32 = 1;

/// Magic bytes for archive file identification
pub const MAGIC: &[u8; 8] = b"CHAMPARC";
