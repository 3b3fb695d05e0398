//! Pluggable key hashing
//!
//! The table only needs one 64-bit hash per key. Anything implementing
//! [`KeyHasher`] can supply it, including plain closures, which makes it
//! easy to force collisions in tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Source of 64-bit hashes for table keys
///
/// Equal keys must produce equal hashes. Unequal keys may collide; the
/// table always compares the full key after the hash.
pub trait KeyHasher<K: ?Sized> {
    /// Hash one key.
    fn hash_key(&self, key: &K) -> u64;
}

impl<K: ?Sized, F: Fn(&K) -> u64> KeyHasher<K> for F {
    #[inline(always)]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Default [`KeyHasher`], using the standard library's SipHash with fixed keys
///
/// Output is deterministic for a given build of the standard library, so
/// probe layouts are reproducible between runs.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct StdKeyHasher;

impl<K: Hash + ?Sized> KeyHasher<K> for StdKeyHasher {
    fn hash_key(&self, key: &K) -> u64 {
        let mut state = DefaultHasher::new();
        key.hash(&mut state);
        state.finish()
    }
}

/// Home slot for a hash in a table of `capacity` slots.
#[inline(always)]
pub(crate) fn home_slot(hash: u64, capacity: usize) -> usize {
    let capacity_u64: u64 = capacity
        .try_into()
        .expect("slot counts always fit in a u64");
    (hash % capacity_u64)
        .try_into()
        .expect("remainder is below a usize capacity")
}

/// Number of linear probe steps from slot `from` forward to slot `to`.
#[inline(always)]
pub(crate) fn probe_distance(from: usize, to: usize, capacity: usize) -> usize {
    if to >= from {
        to - from
    } else {
        capacity - from + to
    }
}
