//! A minimum-priority queue over unique `u32` keys.
//!
//! [`IndexedMinHeap`] supports the usual insert / peek / delete-min, plus
//! changing the key of, or removing, any element by key in logarithmic time.
//! It does so by mirroring every slot move into a [`HashTable`] that maps each
//! key to its current position in the heap array.
//!
//! ```
//! use indexed_pq::IndexedMinHeap;
//!
//! let mut heap = IndexedMinHeap::new(8)?;
//! heap.insert(30, "c");
//! heap.insert(10, "a");
//! heap.insert(20, "b");
//! assert_eq!(heap.peek_min(), Some((10, &"a")));
//!
//! assert!(heap.decrease_key(30, 25));
//! assert_eq!(heap.peek_min_key(), Some(5));
//! assert!(heap.remove(10));
//! assert_eq!(heap.get(20), Some(&"b"));
//! # Ok::<(), indexed_pq::Error>(())
//! ```

pub mod error;
pub mod hash_table;
pub mod indexed_min_heap;
pub mod prime;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use hash_table::HashTable;
pub use indexed_min_heap::IndexedMinHeap;

/// Key type shared by the hash table and the heap.
pub type Key = u32;
