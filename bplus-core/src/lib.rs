//! An in-memory ordered map built on a B+ Tree, written in Rust.
//!
//! Keys are ordered by a caller-supplied comparator. Entries live in leaves that are chained in
//! key order, so the first and last entries are O(1) and in-order traversal walks the chain
//! without going back through the index pages. Point lookups, inserts and deletes descend the
//! tree once and rebalance on the way down.
//!
//! # Get, Set, Delete
//!
//! ```
//! use bplus::BPTree;
//!
//! let mut tree = BPTree::new(|a: &i32, b: &i32| a.cmp(b));
//! tree.set(5, "five");
//! tree.set(10, "ten");
//! tree.set(1, "one");
//!
//! assert_eq!(tree.first(), Some((&1, &"one")));
//! assert_eq!(tree.last(), Some((&10, &"ten")));
//! assert_eq!(tree.get(&5), Some(&"five"));
//! assert_eq!(tree.len(), 3);
//!
//! // Setting an existing key replaces its value.
//! assert_eq!(tree.set(5, "FIVE"), Some("five"));
//!
//! assert!(tree.delete(&5));
//! assert!(!tree.contains(&5));
//! assert_eq!(tree.len(), 2);
//! ```
//!
//! # Put
//!
//! `put` hands the current value to a closure, which decides what to write:
//!
//! ```
//! use bplus::BPTree;
//!
//! let mut counts = BPTree::default();
//! for word in ["theta", "bplus", "theta"] {
//!     counts.put(word, |count: Option<&u32>| Some(count.map_or(1, |c| c + 1)));
//! }
//! assert_eq!(counts.get(&"theta"), Some(&2));
//! assert_eq!(counts.get(&"bplus"), Some(&1));
//!
//! // Returning `None` leaves the tree as it is.
//! assert_eq!(counts.put("gamma", |_| None), (None, false));
//! assert!(!counts.contains(&"gamma"));
//! ```
//!
//! # Enumerator
//!
//! An [`Enumerator`] walks the tree in either direction. It doesn't borrow the tree, which may
//! be modified between steps:
//!
//! ```
//! use bplus::BPTree;
//!
//! let mut tree = BPTree::default();
//! for key in 0..10 {
//!     tree.set(key, key * 10);
//! }
//!
//! let (mut e, hit) = tree.seek(&3);
//! assert!(hit);
//! assert_eq!(e.next(&tree), Some((&3, &30)));
//!
//! tree.delete(&4);
//! assert_eq!(e.next(&tree), Some((&5, &50)));
//!
//! let mut e = tree.seek_last().unwrap();
//! assert_eq!(e.prev(&tree), Some((&9, &90)));
//! assert_eq!(e.prev(&tree), Some((&8, &80)));
//! ```
//!
//! For a plain traversal, [`BPTree::iter`] borrows the tree instead:
//!
//! ```
//! use bplus::BPTree;
//!
//! let mut tree = BPTree::default();
//! for key in [3, 1, 2] {
//!     tree.set(key, ());
//! }
//! let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, [1, 2, 3]);
//! assert_eq!(tree.iter().rev().next(), Some((&3, &())));
//! ```

mod bptree;
mod error;
mod freelist;
mod storage;

pub use crate::{
    bptree::{BPTree, Enumerator, Iter},
    error::{Error, ErrorCode, Result},
};

/// The minimum number of entries of a non-root leaf. A leaf holds at most `2 * KD` entries.
pub const KD: usize = 64;

/// The minimum number of separators of a non-root index page. Between two operations an index
/// page holds at most `2 * KX + 1` separators.
pub const KX: usize = 128;
