//! Open-addressing hash table with linear probing
//!
//! Slots are kept in one [`GrowableBuffer`] of `Option<Entry>`. Each entry
//! stores its full 64-bit hash next to the key and value, so probing can
//! reject most non-matching slots without comparing keys, and growth never
//! needs to rehash a key.
//!
//! The probe invariant: for every stored key, a linear probe starting at
//! `hash % capacity` and wrapping around reaches the key's slot before it
//! reaches any empty slot. Everything below exists to keep that true.
//!
//! - Insertion probes from the home slot to the first empty slot. A key
//!   that is already present is left alone; this table never updates a
//!   value in place on insert.
//! - When every slot is full, the table grows to `capacity * 3/2` (rounded
//!   up) by re-inserting every entry into a fresh slot array. Entries
//!   generally land in different slots afterwards.
//! - Erasing uses backward-shift deletion: each following entry in the
//!   same probe run is pulled back into the hole if the hole lies on its
//!   own probe path. No tombstones are ever left behind, so a probe can
//!   always stop at the first empty slot.

mod hash;

pub use hash::{KeyHasher, StdKeyHasher};

use crate::{BufferConfig, Error, GrowableBuffer};
use hash::{home_slot, probe_distance};
use std::fmt::{self, Debug};
use std::mem;

/// One stored key/value pair and its cached hash
#[derive(Clone)]
struct Entry<K, V> {
    /// Output of the table's [`KeyHasher`] for `key`
    hash: u64,
    /// Stored key
    key: K,
    /// Stored value
    value: V,
}

/// Open-addressing hash table with linear probing and incremental growth
pub struct OpenAddressHashTable<K, V, H = StdKeyHasher> {
    /// Slot array; its length is the table capacity
    slots: GrowableBuffer<Option<Entry<K, V>>>,
    /// Number of occupied slots
    len: usize,
    /// Hash function for keys
    hasher: H,
    /// Allocation policy for the slot array
    config: BufferConfig,
}

impl<K: Eq, V> OpenAddressHashTable<K, V, StdKeyHasher>
where
    StdKeyHasher: KeyHasher<K>,
{
    /// Create an empty table with the default capacity and hasher.
    pub fn new() -> Result<Self, Error> {
        TableBuilder::new().build()
    }
}

impl<K: Eq, V, H: KeyHasher<K>> OpenAddressHashTable<K, V, H> {
    /// Build an empty table of exactly `capacity` slots.
    fn with_parts(capacity: usize, hasher: H, config: BufferConfig) -> Result<Self, Error> {
        Ok(Self {
            slots: Self::allocate_slots(capacity, config)?,
            len: 0,
            hasher,
            config,
        })
    }

    /// Allocate `capacity` empty slots.
    fn allocate_slots(
        capacity: usize,
        config: BufferConfig,
    ) -> Result<GrowableBuffer<Option<Entry<K, V>>>, Error> {
        let mut slots = GrowableBuffer::with_hint(capacity, config);
        slots.resize_with(capacity, || None)?;
        Ok(slots)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The key hasher in use.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Slot after `slot`, wrapping around.
    #[inline(always)]
    fn step(&self, slot: usize) -> usize {
        if slot + 1 == self.capacity() {
            0
        } else {
            slot + 1
        }
    }

    /// Probe for `key` from its home slot.
    ///
    /// Stops at the first empty slot, or after visiting every slot.
    fn probe(&self, hash: u64, key: &K) -> Option<usize> {
        let mut slot = home_slot(hash, self.capacity());
        for _ in 0..self.capacity() {
            match &self.slots[slot] {
                None => return None,
                Some(entry) if entry.hash == hash && entry.key == *key => return Some(slot),
                Some(_) => slot = self.step(slot),
            }
        }
        None
    }

    /// First empty slot on the probe path for `hash`.
    ///
    /// Requires at least one empty slot.
    fn vacant_slot(&self, hash: u64) -> usize {
        debug_assert!(self.len < self.capacity());
        let mut slot = home_slot(hash, self.capacity());
        while self.slots[slot].is_some() {
            slot = self.step(slot);
        }
        slot
    }

    /// Borrow the occupied entry at `slot`.
    fn entry(&self, slot: usize) -> &Entry<K, V> {
        self.slots[slot]
            .as_ref()
            .expect("probe only reports occupied slots")
    }

    /// Replace the slot array with one `3/2` times larger, re-inserting every
    /// entry. On failure nothing changes.
    fn grow(&mut self) -> Result<(), Error> {
        let capacity = self.capacity();
        let grown = capacity
            .checked_add(capacity / 2 + capacity % 2)
            .ok_or(Error::NoMemory)?;
        let fresh = Self::allocate_slots(grown, self.config)?;
        let mut old = mem::replace(&mut self.slots, fresh);
        for entry in old.iter_mut().filter_map(Option::take) {
            let slot = self.vacant_slot(entry.hash);
            self.slots[slot] = Some(entry);
        }
        tracing::debug!(from = capacity, to = grown, len = self.len, "hash table rehashed");
        Ok(())
    }

    /// Insert `key` with `value` if the key is not already present.
    ///
    /// Returns `Ok(true)` if the entry was added. If the key is already
    /// present, returns `Ok(false)`, keeps the stored value and drops
    /// `value`. Insert never updates an existing entry.
    pub fn insert(&mut self, key: K, value: V) -> Result<bool, Error> {
        let hash = self.hasher.hash_key(&key);
        if self.probe(hash, &key).is_some() {
            return Ok(false);
        }
        if self.len == self.capacity() {
            self.grow()?;
        }
        let slot = self.vacant_slot(hash);
        self.slots[slot] = Some(Entry { hash, key, value });
        self.len += 1;
        Ok(true)
    }

    /// Find the slot currently holding `key`.
    ///
    /// Slot positions are only meaningful until the next growth.
    pub fn find(&self, key: &K) -> Result<usize, Error> {
        self.probe(self.hasher.hash_key(key), key)
            .ok_or(Error::NotFound)
    }

    /// Borrow the value stored for `key`.
    pub fn get(&self, key: &K) -> Result<&V, Error> {
        let slot = self.find(key)?;
        Ok(&self.entry(slot).value)
    }

    /// Mutably borrow the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        let slot = self.find(key)?;
        let entry = self.slots[slot]
            .as_mut()
            .expect("probe only reports occupied slots");
        Ok(&mut entry.value)
    }

    /// True if `key` is stored.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_ok()
    }

    /// Remove `key` and return its value.
    ///
    /// Uses backward-shift deletion so every other key stays reachable.
    pub fn erase(&mut self, key: &K) -> Result<V, Error> {
        let mut hole = self.find(key)?;
        let removed = self.slots[hole]
            .take()
            .expect("probe only reports occupied slots");

        let capacity = self.capacity();
        let mut next = self.step(hole);
        for _ in 1..capacity {
            let home = match &self.slots[next] {
                None => break,
                Some(entry) => home_slot(entry.hash, capacity),
            };
            // The hole is on this entry's probe path if it comes before the
            // entry's current slot, counting from the entry's home.
            if probe_distance(home, hole, capacity) < probe_distance(home, next, capacity) {
                self.slots[hole] = self.slots[next].take();
                hole = next;
            }
            next = self.step(next);
        }

        self.len -= 1;
        Ok(removed.value)
    }

    /// Remove every entry. Capacity is unchanged.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }

    /// Iterate over entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|e| (&e.key, &e.value)))
    }

    /// Iterate over every slot, empty or not, in slot order.
    ///
    /// This is a read-only view for tools that draw the probe layout.
    pub fn buckets(&self) -> impl ExactSizeIterator<Item = BucketView<'_, K, V>> + '_ {
        let capacity = self.capacity();
        self.slots
            .iter()
            .enumerate()
            .map(move |(index, slot)| match slot {
                None => BucketView::Empty,
                Some(entry) => {
                    let home = home_slot(entry.hash, capacity);
                    BucketView::Occupied {
                        hash: entry.hash,
                        home,
                        distance: probe_distance(home, index, capacity),
                        key: &entry.key,
                        value: &entry.value,
                    }
                }
            })
    }

    /// Check the probe invariant for every entry, panicking on the first
    /// violation.
    #[cfg(any(test, feature = "invariants"))]
    #[cfg_attr(feature = "invariants", visibility::make(pub))]
    pub(crate) fn check_probes(&self) {
        let capacity = self.capacity();
        let mut occupied = 0;
        for (slot, item) in self.slots.iter().enumerate() {
            let Some(entry) = item else { continue };
            occupied += 1;
            assert_eq!(self.hasher.hash_key(&entry.key), entry.hash, "stale hash");
            let mut walk = home_slot(entry.hash, capacity);
            while walk != slot {
                assert!(
                    self.slots[walk].is_some(),
                    "empty slot {walk} splits probe run for slot {slot}"
                );
                walk = self.step(walk);
            }
            assert_eq!(self.probe(entry.hash, &entry.key), Some(slot));
        }
        assert_eq!(occupied, self.len, "entry count disagrees with len");
    }
}

impl<K: Eq + Clone, V: Clone, H: KeyHasher<K> + Clone> OpenAddressHashTable<K, V, H> {
    /// Deep copy with the same capacity and slot layout.
    ///
    /// Fails with [`Error::NoMemory`] if the slot array can't be
    /// allocated.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            slots: self.slots.try_clone()?,
            len: self.len,
            hasher: self.hasher.clone(),
            config: self.config,
        })
    }
}

impl<K: Eq + Debug, V: Debug, H: KeyHasher<K>> Debug for OpenAddressHashTable<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Contents of one slot, as reported by [`OpenAddressHashTable::buckets()`]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum BucketView<'a, K, V> {
    /// Nothing stored here
    Empty,
    /// One stored entry
    Occupied {
        /// Cached hash of the key
        hash: u64,
        /// Slot where the probe for this key starts
        home: usize,
        /// Probe steps from `home` to this slot
        distance: usize,
        /// Stored key
        key: &'a K,
        /// Stored value
        value: &'a V,
    },
}

/// Builder for [`OpenAddressHashTable`] instances with custom settings
#[derive(Debug, Clone)]
pub struct TableBuilder<H = StdKeyHasher> {
    /// Initial slot count
    capacity: usize,
    /// Allocation policy for the slot array
    config: BufferConfig,
    /// Hasher handed to every table we build
    hasher: H,
}

impl TableBuilder<StdKeyHasher> {
    /// Create a new [`TableBuilder`] with the default hasher and capacity.
    pub fn new() -> Self {
        Self::with_hasher(StdKeyHasher)
    }
}

impl Default for TableBuilder<StdKeyHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TableBuilder<H> {
    /// Slot count for a new table, unless overridden
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Create a new [`TableBuilder`] using a specific [`KeyHasher`].
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            config: BufferConfig::default(),
            hasher,
        }
    }

    /// Select the initial number of slots.
    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    /// Select the allocation policy for the slot array.
    ///
    /// A `max_capacity` here bounds how far the table can grow.
    pub fn config(&mut self, config: BufferConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Build an empty table.
    ///
    /// Fails with [`Error::BadValue`] for a zero capacity and with
    /// [`Error::NoMemory`] if the slots can't be allocated.
    pub fn build<K: Eq, V>(&self) -> Result<OpenAddressHashTable<K, V, H>, Error>
    where
        H: KeyHasher<K> + Clone,
    {
        if self.capacity == 0 {
            return Err(Error::BadValue);
        }
        OpenAddressHashTable::with_parts(self.capacity, self.hasher.clone(), self.config)
    }
}

#[cfg(test)]
mod test {
    use super::{BucketView, OpenAddressHashTable, TableBuilder};
    use crate::Error;

    /// Table whose hash is the key itself, so home slots are predictable
    fn identity_table(capacity: usize) -> OpenAddressHashTable<u64, &'static str, fn(&u64) -> u64> {
        let hasher: fn(&u64) -> u64 = |k| *k;
        TableBuilder::with_hasher(hasher)
            .capacity(capacity)
            .build()
            .expect("table")
    }

    #[test]
    fn duplicate_insert_keeps_first_value() {
        let mut t = identity_table(8);
        assert_eq!(t.insert(3, "first"), Ok(true));
        assert_eq!(t.insert(3, "second"), Ok(false));
        assert_eq!(t.get(&3), Ok(&"first"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn backward_shift_across_wrap() {
        let mut t = identity_table(8);
        // 6, 14 and 22 all start at slot 6; 7 starts at 7.
        for k in [6, 14, 22, 7] {
            assert_eq!(t.insert(k, "x"), Ok(true));
        }
        assert_eq!(t.find(&6), Ok(6));
        assert_eq!(t.find(&14), Ok(7));
        assert_eq!(t.find(&22), Ok(0));
        assert_eq!(t.find(&7), Ok(1));

        assert_eq!(t.erase(&6), Ok("x"));
        t.check_probes();
        assert_eq!(t.find(&14), Ok(6));
        assert_eq!(t.find(&22), Ok(7));
        assert_eq!(t.find(&7), Ok(0));
        assert_eq!(t.find(&6), Err(Error::NotFound));
    }

    #[test]
    fn shift_skips_entries_at_home() {
        let mut t = identity_table(8);
        // 1, 9 and 17 share home slot 1; 3 sits at its own home in between.
        for k in [1, 9, 3, 17] {
            t.insert(k, "x").expect("insert");
        }
        assert_eq!(t.find(&3), Ok(3));
        assert_eq!(t.find(&17), Ok(4));
        t.erase(&1).expect("erase");
        t.check_probes();
        assert_eq!(t.find(&9), Ok(1));
        assert_eq!(t.find(&17), Ok(2));
        assert_eq!(t.find(&3), Ok(3));
    }

    #[test]
    fn grows_when_full() {
        let mut t = identity_table(4);
        for k in 0..4 {
            t.insert(k, "x").expect("insert");
        }
        assert_eq!(t.capacity(), 4);
        assert_eq!(t.find(&99), Err(Error::NotFound));
        t.insert(4, "y").expect("insert");
        assert_eq!(t.capacity(), 6);
        t.insert(5, "y").expect("insert");
        t.insert(6, "y").expect("insert");
        assert_eq!(t.capacity(), 9);
        t.check_probes();
        for k in 0..7 {
            assert!(t.contains_key(&k));
        }
    }

    #[test]
    fn erase_from_full_table() {
        let mut t = identity_table(4);
        for k in [0, 4, 8, 12] {
            t.insert(k, "x").expect("insert");
        }
        assert_eq!(t.erase(&4), Ok("x"));
        t.check_probes();
        assert_eq!(t.len(), 3);
        for k in [0, 8, 12] {
            assert!(t.contains_key(&k));
        }
    }

    #[test]
    fn bucket_views() {
        let mut t = identity_table(4);
        t.insert(1, "a").expect("insert");
        t.insert(5, "b").expect("insert");
        let views: Vec<_> = t.buckets().collect();
        assert_eq!(views[0], BucketView::Empty);
        assert_eq!(
            views[2],
            BucketView::Occupied {
                hash: 5,
                home: 1,
                distance: 1,
                key: &5,
                value: &"b",
            }
        );
    }

    #[test]
    fn try_clone_is_independent() {
        let mut t = identity_table(4);
        for k in [1, 5, 9] {
            t.insert(k, "x").expect("insert");
        }
        let mut c = t.try_clone().expect("clone");
        assert_eq!(c.capacity(), 4);
        assert_eq!(c.find(&9), t.find(&9));
        c.erase(&1).expect("erase");
        c.check_probes();
        assert!(t.contains_key(&1));
        assert_eq!(t.len(), 3);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn zero_capacity_rejected() {
        let built = TableBuilder::new().capacity(0).build::<u32, u32>();
        assert!(matches!(built, Err(Error::BadValue)));
    }
}
