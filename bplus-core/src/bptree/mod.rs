use std::{
    cmp::Ordering,
    sync::atomic::{self, AtomicU64},
};

pub use cursor::{Enumerator, Iter};

use crate::{bptree::node::Node, storage::PageId};

#[macro_use]
mod search;

mod branch;
mod check;
mod crud;
mod cursor;
mod debug;
mod entry;
mod index;
mod leaf;
mod node;
mod rebalance;

pub(crate) use check::{Accounting, Linkage, Occupancy, Order};
use index::TreeIndex;

/// A B+ Tree based ordered map.
///
/// Its structure consists of nodes, which are divided into two types: index pages and leaves
/// (data pages). All entries live in leaves, and leaves are chained in key order so that the
/// first and last entries and sequential traversal are O(1).
///
/// Keys are ordered by the comparator `C`, which must define a strict total order over `K`.
/// A comparator violating this precondition leaves the tree in an unspecified (but memory-safe)
/// state. It isn't validated.
pub struct BPTree<K, V, C = fn(&K, &K) -> Ordering> {
    /// Owns every page of the tree.
    index: TreeIndex<K, V>,
    root: Option<Node>,
    /// The first leaf of the chain.
    first: Option<PageId>,
    /// The last leaf of the chain.
    last: Option<PageId>,
    len: usize,
    cmp: C,
    /// Bumped once per call that mutates the tree, enumerators use it to detect staleness.
    version: u64,
    /// Binds enumerators to the tree that created them.
    id: u64,
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

impl<K, V, C> BPTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an empty tree that orders its keys with `cmp`.
    ///
    /// `cmp(a, b)` returns [`Ordering::Less`] if `a < b`, [`Ordering::Equal`] if `a == b` and
    /// [`Ordering::Greater`] if `a > b`.
    #[inline]
    pub fn new(cmp: C) -> Self {
        Self {
            index: TreeIndex::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
            cmp,
            version: 0,
            id: NEXT_TREE_ID.fetch_add(1, atomic::Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for BPTree<K, V>
where
    K: Ord,
{
    /// Creates an empty tree ordered by [`Ord`].
    #[inline]
    fn default() -> Self {
        Self::new(K::cmp)
    }
}
