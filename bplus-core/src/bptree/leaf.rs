use std::cmp::Ordering;

use crate::{
    bptree::{entry::Entry, search::SearchIndex},
    storage::PageId,
    KD,
};

/// A data page: up to `2 * KD` entries sorted by key, threaded into the leaf chain.
pub(crate) struct Leaf<K, V> {
    entries: Vec<Entry<K, V>>,
    /// The previous leaf in key order.
    pub(crate) prev: Option<PageId>,
    /// The next leaf in key order.
    pub(crate) next: Option<PageId>,
}

impl<K, V> Leaf<K, V> {
    /// The maximum number of entries in a leaf.
    pub(crate) const CAPACITY: usize = 2 * KD;

    #[inline]
    pub(crate) fn new() -> Self {
        Self::with_entries(Vec::with_capacity(Self::CAPACITY), None, None)
    }

    #[inline]
    fn with_entries(entries: Vec<Entry<K, V>>, prev: Option<PageId>, next: Option<PageId>) -> Self {
        Self {
            entries,
            prev,
            next,
        }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.count() >= Self::CAPACITY
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> &Entry<K, V> {
        &self.entries[index]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut Entry<K, V> {
        &mut self.entries[index]
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    /// The key of the first entry, which is also the effective key of any separator
    /// referencing this leaf.
    #[inline]
    pub(crate) fn first_key(&self) -> &K {
        &self.entries[0].key
    }

    pub(crate) fn search<C>(&self, key: &K, cmp: &C) -> SearchIndex
    where
        C: Fn(&K, &K) -> Ordering,
    {
        search!(self.count(), idx => cmp(key, &self.entries[idx].key))
    }

    #[inline]
    pub(crate) fn insert(&mut self, index: usize, entry: Entry<K, V>) {
        debug_assert!(!self.is_full(), "inserting into a full leaf");
        self.entries.insert(index, entry);
    }

    #[inline]
    pub(crate) fn remove(&mut self, index: usize) -> Entry<K, V> {
        self.entries.remove(index)
    }

    /// Moves the upper half of the entries, starting at `at`, into a new leaf linked right
    /// after `this` (whose id is `this`). Linking the neighbours is up to the caller.
    pub(crate) fn split_off(&mut self, this: PageId, at: usize) -> Self {
        let mut upper = Vec::with_capacity(Self::CAPACITY);
        upper.extend(self.entries.drain(at..));
        Self::with_entries(upper, Some(this), self.next)
    }

    /// Moves the first `count` entries of `right` to the end of `left`.
    pub(crate) fn shift_left(left: &mut Self, right: &mut Self, count: usize) {
        left.entries.extend(right.entries.drain(..count));
    }

    /// Moves the last `count` entries of `left` to the front of `right`.
    pub(crate) fn shift_right(left: &mut Self, right: &mut Self, count: usize) {
        let start = left.count() - count;
        right.entries.splice(..0, left.entries.drain(start..));
    }
}
