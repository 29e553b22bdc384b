//! Hashed trie (CHAMP) underlying every container
//!
//! This implements a hash-array mapped trie where:
//! - Each branch indexes up to 32 slots with two bitmaps (values, children)
//! - Unchanged subtrees are shared between container versions via `Arc`
//! - A uniquely owned path is edited in place, a shared one is copied first

mod champ;
mod iter;
mod node;
mod policy;

pub use champ::Champ;
pub use iter::Iter;
pub use node::{fragment, index, is_uniquely_owned, mask, Node, BITS_PER_LEVEL, MAX_SHIFT};
pub use policy::{hash_one, KeyPolicy, MapPolicy, SetPolicy};
