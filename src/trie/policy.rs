//! Key projection and hashing for trie values

use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// Computes the 64-bit hash that places a value in the trie.
///
/// Archived bitmaps are laid out by this hash, so it must not change between
/// builds or platforms: SipHash-1-3 with zero keys, integers fed little-endian.
pub fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = StableHasher(SipHasher13::new_with_keys(0, 0));
    value.hash(&mut hasher);
    hasher.finish()
}

/// Feeds integers to SipHash in little-endian order, `usize` as 64 bits
struct StableHasher(SipHasher13);

impl Hasher for StableHasher {
    fn finish(&self) -> u64 {
        self.0.finish()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }

    fn write_u16(&mut self, n: u16) {
        self.write(&n.to_le_bytes());
    }

    fn write_u32(&mut self, n: u32) {
        self.write(&n.to_le_bytes());
    }

    fn write_u64(&mut self, n: u64) {
        self.write(&n.to_le_bytes());
    }

    fn write_u128(&mut self, n: u128) {
        self.write(&n.to_le_bytes());
    }

    fn write_usize(&mut self, n: usize) {
        self.write_u64(n as u64);
    }
}

/// How the trie finds the key inside a stored value
///
/// Sets store bare keys; maps store `(key, value)` pairs and hash only the key.
pub trait KeyPolicy<T> {
    /// The part of a stored value that is hashed and compared
    type Key: Hash + Eq;

    fn key(value: &T) -> &Self::Key;

    fn hash(value: &T) -> u64 {
        hash_one(Self::key(value))
    }
}

/// Values are their own keys
#[derive(Clone, Copy, Debug, Default)]
pub struct SetPolicy;

impl<T: Hash + Eq> KeyPolicy<T> for SetPolicy {
    type Key = T;

    fn key(value: &T) -> &T {
        value
    }
}

/// Values are `(key, value)` pairs keyed by their first element
#[derive(Clone, Copy, Debug, Default)]
pub struct MapPolicy;

impl<K: Hash + Eq, V> KeyPolicy<(K, V)> for MapPolicy {
    type Key = K;

    fn key(value: &(K, V)) -> &K {
        &value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_one_deterministic() {
        assert_eq!(hash_one("hello"), hash_one("hello"));
        assert_ne!(hash_one("hello"), hash_one("world"));
    }

    #[test]
    fn test_hash_one_is_pinned() {
        // Archives written by any build must agree on these.
        assert_eq!(hash_one(&42u64), 0x7b3e_724b_36eb_df51);
        assert_eq!(hash_one("hello"), 0xe037_876b_880b_8ed9);
        assert_eq!(hash_one(&42u32), hash_one(&42u32));
    }

    #[test]
    fn test_map_policy_hashes_key_only() {
        let a = ("k".to_string(), 1);
        let b = ("k".to_string(), 2);
        assert_eq!(MapPolicy::hash(&a), MapPolicy::hash(&b));
        assert_eq!(MapPolicy::hash(&a), hash_one(&"k".to_string()));
    }
}
