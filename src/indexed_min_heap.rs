use std::fmt;

use log::trace;

use crate::error::{Error, Result};
use crate::hash_table::HashTable;
use crate::Key;

/// A node in the heap. Nodes are ordered by `key` (smallest = highest priority).
#[derive(Debug, Clone)]
struct HeapNode<V> {
    key: Key,
    value: V,
}

fn left(parent: usize) -> usize {
    parent * 2 + 1
}
fn right(parent: usize) -> usize {
    parent * 2 + 2
}
fn parent(child: usize) -> usize {
    (child - 1) / 2
}

/// A bounded min-heap over unique `u32` keys. The smallest key is at the "top".
///
/// Every key's position in `nodes` is mirrored in a [`HashTable`], which lets
/// any element be found in constant expected time and then re-keyed or removed
/// with a logarithmic number of swaps.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<V> {
    /// The actual heap storage (array-based).
    nodes: Vec<HeapNode<V>>,
    /// Maps keys -> index in the `nodes` vector.
    indices: HashTable<usize>,
    max_size: usize,
}

impl<V> IndexedMinHeap<V> {
    /// Creates an empty heap that holds at most `max_size` elements.
    ///
    /// The key index starts at the smallest prime `>= max_size` buckets.
    pub fn new(max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::InvalidArgument(
                "heap max size must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            nodes: Vec::with_capacity(max_size),
            indices: HashTable::with_min_capacity(max_size),
            max_size,
        })
    }

    /// Returns the number of items in the heap.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.max_size
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.indices.contains_key(key)
    }

    /// Inserts a new `(key, value)` pair.
    ///
    /// Returns `false` without inserting if the heap is full or `key` is
    /// already present.
    pub fn insert(&mut self, key: Key, value: V) -> bool {
        if self.is_full() {
            trace!("rejecting key {}: heap is full ({})", key, self.max_size);
            return false;
        }
        if self.indices.contains_key(key) {
            trace!("rejecting key {}: already present", key);
            return false;
        }
        let idx = self.nodes.len();
        self.nodes.push(HeapNode { key, value });
        self.indices.insert(key, idx);
        self.bubble_up(idx);
        true
    }

    /// Returns the smallest key and its value without removing them.
    pub fn peek_min(&self) -> Option<(Key, &V)> {
        self.nodes.first().map(|node| (node.key, &node.value))
    }

    pub fn peek_min_key(&self) -> Option<Key> {
        self.nodes.first().map(|node| node.key)
    }

    pub fn peek_min_value(&self) -> Option<&V> {
        self.nodes.first().map(|node| &node.value)
    }

    /// Removes and returns the `(key, value)` with the smallest key.
    /// Returns `None` if empty.
    pub fn pop_min(&mut self) -> Option<(Key, V)> {
        if self.nodes.is_empty() {
            return None;
        }
        let node = self.remove_at(0);
        Some((node.key, node.value))
    }

    /// Removes the smallest element. Returns `false` if the heap is empty.
    pub fn delete_min(&mut self) -> bool {
        self.pop_min().is_some()
    }

    pub fn get(&self, key: Key) -> Option<&V> {
        let &idx = self.indices.get(key)?;
        Some(&self.nodes[idx].value)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let &idx = self.indices.get(key)?;
        Some(&mut self.nodes[idx].value)
    }

    /// Replaces `key` with `key - delta` and moves the element toward the top.
    ///
    /// Returns `false` if `delta` is zero, `key` is absent, or `key - delta`
    /// is already present. The subtraction wraps on underflow.
    pub fn decrease_key(&mut self, key: Key, delta: Key) -> bool {
        if delta == 0 {
            return false;
        }
        self.rekey(key, key.wrapping_sub(delta))
    }

    /// Replaces `key` with `key + delta` and moves the element toward the bottom.
    ///
    /// Same rejection rules as [`decrease_key`](Self::decrease_key). The
    /// addition wraps on overflow.
    pub fn increase_key(&mut self, key: Key, delta: Key) -> bool {
        if delta == 0 {
            return false;
        }
        self.rekey(key, key.wrapping_add(delta))
    }

    fn rekey(&mut self, key: Key, new_key: Key) -> bool {
        let idx = match self.indices.get(key) {
            Some(&idx) => idx,
            None => return false,
        };
        if self.indices.contains_key(new_key) {
            return false;
        }
        self.indices.remove(key);
        self.nodes[idx].key = new_key;
        self.indices.insert(new_key, idx);
        // A wrapped key may have to go the "wrong" way, so look both ways.
        self.resettle(idx);
        true
    }

    /// Removes `key` from the heap. Returns `false` if it was not present.
    pub fn remove(&mut self, key: Key) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` from the heap, returning its value if it was present.
    pub fn take(&mut self, key: Key) -> Option<V> {
        let &idx = self.indices.get(key)?;
        Some(self.remove_at(idx).value)
    }

    /// Iterates over `(key, value)` pairs in heap-array order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &V)> + '_ {
        self.nodes.iter().map(|node| (node.key, &node.value))
    }

    // Moves the last node into `idx` and restores heap order around it.
    fn remove_at(&mut self, idx: usize) -> HeapNode<V> {
        let removed = self.nodes.swap_remove(idx);
        self.indices.remove(removed.key);
        if idx < self.nodes.len() {
            self.reindex(idx);
            self.resettle(idx);
        }
        removed
    }

    // Helper: send the node at `idx` up if it beats its parent, otherwise down.
    fn resettle(&mut self, idx: usize) {
        if idx > 0 && self.nodes[idx].key < self.nodes[parent(idx)].key {
            self.bubble_up(idx);
        } else {
            self.bubble_down(idx);
        }
    }

    fn reindex(&mut self, idx: usize) {
        let updated = self.indices.update(self.nodes[idx].key, idx);
        debug_assert!(updated, "key {} missing from index", self.nodes[idx].key);
    }

    // Helper: bubble up from `idx` if heap property is violated.
    fn bubble_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent_idx = parent(idx);
            if self.nodes[idx].key < self.nodes[parent_idx].key {
                self.nodes.swap(idx, parent_idx);
                self.reindex(idx);
                self.reindex(parent_idx);
                idx = parent_idx;
            } else {
                break;
            }
        }
    }

    // Helper: bubble down from `idx` if children have smaller keys.
    fn bubble_down(&mut self, mut idx: usize) {
        let len = self.nodes.len();
        loop {
            let left_child = left(idx);
            let right_child = right(idx);
            let mut smallest = idx;

            if left_child < len && self.nodes[left_child].key < self.nodes[smallest].key {
                smallest = left_child;
            }
            if right_child < len && self.nodes[right_child].key < self.nodes[smallest].key {
                smallest = right_child;
            }
            if smallest != idx {
                self.nodes.swap(idx, smallest);
                self.reindex(idx);
                self.reindex(smallest);
                idx = smallest;
            } else {
                break;
            }
        }
    }
}

/// Prints the heap one level per line: `(key,value)` pairs separated by spaces.
impl<V: fmt::Display> fmt::Display for IndexedMinHeap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = 0;
        let mut width = 1;
        while start < self.nodes.len() {
            let end = (start + width).min(self.nodes.len());
            for (i, node) in self.nodes[start..end].iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "({},{})", node.key, node.value)?;
            }
            writeln!(f)?;
            start = end;
            width *= 2;
        }
        Ok(())
    }
}
