//! ChainedHashMap: separate chaining over a power-of-two bucket array.
//!
//! Entries live in a `SlotMap` arena; each bucket stores the slot key of its
//! chain head and each entry stores the slot key of its successor. Growing
//! the table relinks slot keys and never moves or clones an entry.

use crate::config::{table_size_for, MapConfig};
use crate::error::MapError;
use crate::probe_guard::ProbeGuard;
use crate::stats::TableStats;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Bucket count of `ChainedHashMap::new`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Fraction of the bucket count that may be filled before the table doubles.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Largest bucket count. At this size the table stops growing and chains
/// lengthen instead.
pub const MAX_CAPACITY: usize = 1 << 30;

type Link = Option<DefaultKey>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Link,
}

/// Hash map with separate chaining and doubling growth.
///
/// # Key contract
///
/// A key must not change in any way that affects its `Hash` or `Eq` while it
/// is stored. The map keeps the hash computed at insertion and never
/// re-hashes a stored key; a key mutated through interior mutability becomes
/// unreachable by lookup (a miss, not a panic) until `clear` drops it.
///
/// # Ordering
///
/// New entries are prepended to their chain and growth rebuilds chains, so
/// iteration order is unspecified.
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Link>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    load_factor: f64,
    threshold: usize,
    guard: ProbeGuard,
}

/// Fold the upper half of the hash into the lower half so that small
/// power-of-two tables, which index by low bits only, see every bit.
#[inline]
pub(crate) fn spread(raw: u64) -> u64 {
    raw ^ (raw >> 32)
}

/// Bucket for `hash` in a table of `capacity` buckets. `capacity` must be a
/// power of two.
#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

fn threshold_for(capacity: usize, load_factor: f64) -> usize {
    if capacity >= MAX_CAPACITY {
        usize::MAX
    } else {
        (capacity as f64 * load_factor) as usize
    }
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }

    /// Build from a checked configuration. Fails before allocating if the
    /// capacity is negative or the load factor unusable.
    pub fn from_config(config: &MapConfig) -> Result<Self, MapError> {
        Self::from_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// `capacity` is rounded up to a power of two (`0` becomes `1`) and
    /// clamped to `MAX_CAPACITY`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::build(table_size_for(capacity), DEFAULT_LOAD_FACTOR, hasher)
    }

    pub fn from_config_and_hasher(config: &MapConfig, hasher: S) -> Result<Self, MapError> {
        let capacity = config.validate()?;
        Ok(Self::build(capacity, config.load_factor, hasher))
    }

    fn build(capacity: usize, load_factor: f64, hasher: S) -> Self {
        Self {
            hasher,
            buckets: vec![None; capacity],
            slots: SlotMap::with_key(),
            load_factor,
            threshold: threshold_for(capacity, load_factor),
            guard: ProbeGuard::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        spread(self.hasher.hash_one(q))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets; always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Entry count at which the next new key doubles the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Configured growth factor.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Walk the chain starting at `head`.
    fn chain(&self, head: Link) -> Chain<'_, K, V> {
        Chain {
            slots: &self.slots,
            cursor: head,
        }
    }

    fn find_slot<Q>(&self, hash: u64, q: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let head = self.buckets[bucket_index(hash, self.buckets.len())];
        self.chain(head)
            .find(|(_, e)| e.hash == hash && e.key.borrow() == q)
            .map(|(slot, _)| slot)
    }

    /// Insert or replace. Returns the value previously stored under an equal
    /// key. A new key arriving while `len() >= threshold()` doubles the
    /// table once before it is linked in. Under a small load factor `len()`
    /// can stay above the threshold until later inserts catch up.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = {
            let _probe = self.guard.enter();
            let hash = self.make_hash(&key);
            if let Some(slot) = self.find_slot(hash, &key) {
                return Some(mem::replace(&mut self.slots[slot].value, value));
            }
            hash
        };

        if self.slots.len() >= self.threshold {
            self.grow();
        }

        let idx = bucket_index(hash, self.buckets.len());
        let next = self.buckets[idx];
        let slot = self.slots.insert(Entry {
            key,
            value,
            hash,
            next,
        });
        self.buckets[idx] = Some(slot);
        None
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _probe = self.guard.enter();
        let hash = self.make_hash(q);
        let slot = self.find_slot(hash, q)?;
        Some(&self.slots[slot].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _probe = self.guard.enter();
        let hash = self.make_hash(q);
        let slot = self.find_slot(hash, q)?;
        Some(&mut self.slots[slot].value)
    }

    /// Key and value stored under a key equal to `q`.
    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _probe = self.guard.enter();
        let hash = self.make_hash(q);
        let slot = self.find_slot(hash, q)?;
        let entry = &self.slots[slot];
        Some((&entry.key, &entry.value))
    }

    /// Presence test. Independent of the stored value: a key mapped to
    /// `None` in a `ChainedHashMap<K, Option<T>>` is present.
    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _probe = self.guard.enter();
        let hash = self.make_hash(q);
        self.find_slot(hash, q).is_some()
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Unlink the entry equal to `q` and return it by value.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _probe = self.guard.enter();
        let hash = self.make_hash(q);
        let idx = bucket_index(hash, self.buckets.len());

        let mut prev: Link = None;
        let mut cursor = self.buckets[idx];
        while let Some(slot) = cursor {
            let entry = &self.slots[slot];
            let next = entry.next;
            if entry.hash == hash && entry.key.borrow() == q {
                match prev {
                    None => self.buckets[idx] = next,
                    Some(p) => self.slots[p].next = next,
                }
                return self.slots.remove(slot).map(|e| (e.key, e.value));
            }
            prev = cursor;
            cursor = next;
        }
        None
    }

    /// Drop every entry. Keeps the current capacity; O(capacity).
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|head| *head = None);
        self.slots.clear();
    }

    /// Double the bucket array and relink every entry by its stored hash.
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        if old_capacity >= MAX_CAPACITY {
            self.threshold = usize::MAX;
            return;
        }
        let new_capacity = old_capacity * 2;

        let mut fresh: Vec<Link> = vec![None; new_capacity];
        for head in mem::take(&mut self.buckets) {
            let mut cursor = head;
            while let Some(slot) = cursor {
                let entry = &mut self.slots[slot];
                cursor = entry.next;
                let idx = bucket_index(entry.hash, new_capacity);
                entry.next = fresh[idx];
                fresh[idx] = Some(slot);
            }
        }

        self.buckets = fresh;
        self.threshold = threshold_for(new_capacity, self.load_factor);
        tracing::trace!(
            old_capacity,
            new_capacity,
            entries = self.slots.len(),
            threshold = self.threshold,
            "rehashed chained map"
        );
    }

    /// Chain-length diagnostics. Reads only; the returned snapshot is owned.
    pub fn statistics(&self) -> TableStats {
        TableStats::from_chains(
            self.buckets.len(),
            self.buckets.iter().map(|&head| self.chain(head).count()),
        )
    }

    /// Entries in bucket order, each chain from its head.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: Chain {
                slots: &self.slots,
                cursor: None,
            },
            remaining: self.slots.len(),
        }
    }

    /// Mutable access to every value, in arena order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.slots.values_mut().map(|e| (&e.key, &mut e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Check every structural invariant; used by the property tests.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.buckets.len();
        assert!(capacity.is_power_of_two(), "capacity {capacity}");
        let mut reachable = 0;
        for (idx, &head) in self.buckets.iter().enumerate() {
            for (_, entry) in self.chain(head) {
                assert_eq!(bucket_index(entry.hash, capacity), idx);
                assert_eq!(entry.hash, self.make_hash(&entry.key));
                reachable += 1;
            }
        }
        assert_eq!(reachable, self.slots.len(), "every entry sits in one chain");
    }
}

struct Chain<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    cursor: Link,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (DefaultKey, &'a Entry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let entry = &self.slots[slot];
        self.cursor = entry.next;
        Some((slot, entry))
    }
}

/// Iterator over `(&K, &V)` returned by `ChainedHashMap::iter`.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Link>,
    chain: Chain<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((_, entry)) = self.chain.next() {
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            self.chain.cursor = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
