use std::fmt;
use std::iter;
use std::mem;
use std::ops::Add;

use log::debug;

use crate::error::{Error, Result};
use crate::prime::{is_prime, next_prime};
use crate::Key;

/// An occupied bucket.
#[derive(Debug, Clone)]
struct Slot<V> {
    key: Key,
    value: V,
}

/// An open-addressing map from `u32` keys to `V`.
///
/// The home bucket of a key is `key % table_size`; collisions are resolved by
/// quadratic probing (`home + i*i`). The table size is always prime and the
/// table grows before an insert would bring the load factor to 1/2, so a free
/// bucket is always reachable on the probe sequence.
///
/// Removal empties the bucket outright. Lookups therefore walk the whole probe
/// sequence rather than stopping at the first empty bucket.
#[derive(Debug, Clone)]
pub struct HashTable<V> {
    slots: Vec<Option<Slot<V>>>,
    len: usize,
}

fn empty_slots<V>(table_size: usize) -> Vec<Option<Slot<V>>> {
    iter::repeat_with(|| None).take(table_size).collect()
}

/// Bucket visited at step `i` of the probe sequence for `key`.
fn probe(key: Key, i: usize, table_size: usize) -> usize {
    let m = table_size as u64;
    let home = u64::from(key) % m;
    let offset = (i as u64 * i as u64) % m;
    ((home + offset) % m) as usize
}

/// First empty bucket on the probe sequence for `key`.
fn free_bucket<V>(slots: &[Option<Slot<V>>], key: Key) -> Option<usize> {
    (0..slots.len())
        .map(|i| probe(key, i, slots.len()))
        .find(|&idx| slots[idx].is_none())
}

impl<V> HashTable<V> {
    /// Creates a table with exactly `table_size` buckets.
    ///
    /// Fails if `table_size` is zero or not prime.
    pub fn new(table_size: usize) -> Result<Self> {
        if !is_prime(table_size) {
            return Err(Error::InvalidArgument(format!(
                "table size {} is zero or not prime",
                table_size
            )));
        }
        Ok(Self {
            slots: empty_slots(table_size),
            len: 0,
        })
    }

    /// Creates a table whose size is the smallest prime `>= n`.
    pub fn with_min_capacity(n: usize) -> Self {
        Self {
            slots: empty_slots(next_prime(n)),
            len: 0,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    pub fn table_size(&self) -> usize {
        self.slots.len()
    }

    fn find(&self, key: Key) -> Option<usize> {
        let table_size = self.slots.len();
        (0..table_size)
            .map(|i| probe(key, i, table_size))
            .find(|&idx| matches!(&self.slots[idx], Some(slot) if slot.key == key))
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `key -> value`.
    ///
    /// Returns `false`, leaving the table untouched, if `key` is already present.
    pub fn insert(&mut self, key: Key, value: V) -> bool {
        if self.contains_key(key) {
            return false;
        }
        if 2 * (self.len + 1) >= self.slots.len() {
            self.grow();
        }
        match free_bucket(&self.slots, key) {
            Some(idx) => {
                self.slots[idx] = Some(Slot { key, value });
                self.len += 1;
                true
            }
            None => {
                debug_assert!(false, "no free bucket for key {}", key);
                false
            }
        }
    }

    /// Rebuilds the table at the smallest prime `>= 2 * table_size`, reinserting
    /// entries in their old bucket order.
    fn grow(&mut self) {
        let new_size = next_prime(2 * self.slots.len());
        debug!(
            "growing hash table from {} to {} buckets ({} entries)",
            self.slots.len(),
            new_size,
            self.len
        );
        let old = mem::replace(&mut self.slots, empty_slots(new_size));
        for slot in old.into_iter().flatten() {
            let idx = free_bucket(&self.slots, slot.key);
            debug_assert!(idx.is_some(), "rehash lost key {}", slot.key);
            if let Some(idx) = idx {
                self.slots[idx] = Some(slot);
            }
        }
    }

    pub fn get(&self, key: Key) -> Option<&V> {
        let idx = self.find(key)?;
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let idx = self.find(key)?;
        self.slots[idx].as_mut().map(|slot| &mut slot.value)
    }

    /// Overwrites the value stored for `key`. Returns `false` if `key` is absent.
    pub fn update(&mut self, key: Key, value: V) -> bool {
        match self.get_mut(key) {
            Some(slot_value) => {
                *slot_value = value;
                true
            }
            None => false,
        }
    }

    /// Empties the bucket holding `key`. Returns `false` if `key` is absent.
    pub fn remove(&mut self, key: Key) -> bool {
        match self.find(key) {
            Some(idx) => {
                self.slots[idx] = None;
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Removes every entry whose value equals `value`, returning how many were removed.
    pub fn remove_all_by_value(&mut self, value: &V) -> usize
    where
        V: PartialEq,
    {
        let mut removed = 0;
        for bucket in self.slots.iter_mut() {
            if matches!(bucket, Some(slot) if slot.value == *value) {
                *bucket = None;
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }

    /// Iterates over `(key, value)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &V)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.key, &slot.value))
    }

    /// Returns a copy of `self` with every entry of `other` inserted into it,
    /// in `other`'s bucket order. Keys already in `self` keep their value.
    pub fn merge(&self, other: &Self) -> Self
    where
        V: Clone,
    {
        let mut merged = self.clone();
        for (key, value) in other.iter() {
            merged.insert(key, value.clone());
        }
        merged
    }
}

/// Tables are equal when they hold the same entries, regardless of size or layout.
impl<V: PartialEq> PartialEq for HashTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<V: Eq> Eq for HashTable<V> {}

impl<V: Clone> Add for &HashTable<V> {
    type Output = HashTable<V>;

    fn add(self, rhs: Self) -> HashTable<V> {
        self.merge(rhs)
    }
}

impl<V: fmt::Display> fmt::Display for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bucket) in self.slots.iter().enumerate() {
            match bucket {
                Some(slot) => writeln!(f, "Bucket {}: {} -> {}", i, slot.key, slot.value)?,
                None => writeln!(f, "Bucket {}: (empty)", i)?,
            }
        }
        Ok(())
    }
}
