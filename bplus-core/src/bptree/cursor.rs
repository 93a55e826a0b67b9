use std::{cmp::Ordering, iter::FusedIterator};

use crate::{
    bptree::{index::TreeIndex, node::Node, BPTree},
    storage::PageId,
};

/// A position in the key order of a [`BPTree`], which yields entries on demand.
///
/// An enumerator doesn't borrow the tree. It's handed the tree on each step instead, so the
/// tree may be modified between steps. An enumerator that notices a modification since its
/// last step re-seeks the key it yielded last, so it keeps going from where it left off:
///
/// - it never yields a key twice, and never yields a key that was already removed.
/// - a key inserted after the current position (in the direction of travel) will be yielded.
///
/// Once an enumerator runs past either end it's exhausted, and stays so.
///
/// # Panics
///
/// Stepping an enumerator with a tree other than the one that created it panics.
#[derive(Debug, Clone)]
pub struct Enumerator<K> {
    leaf: Option<PageId>,
    /// The slot of the next entry within `leaf`. It may equal the number of entries, which
    /// stands for the first entry of the next leaf.
    index: usize,
    /// The seek key, or the key yielded last.
    key: K,
    /// Whether `key` itself is still to be yielded.
    hit: bool,
    /// Whether the slot is the successor of an absent seek key, which going backwards
    /// stands for its predecessor.
    gap: bool,
    exhausted: bool,
    version: u64,
    tree: u64,
}

impl<K> Enumerator<K> {
    #[inline]
    fn new<V, C>(
        tree: &BPTree<K, V, C>,
        leaf: Option<PageId>,
        index: usize,
        key: K,
        hit: bool,
    ) -> Self {
        Self {
            leaf,
            index,
            key,
            hit,
            gap: leaf.is_some() && !hit,
            exhausted: false,
            version: tree.version,
            tree: tree.id,
        }
    }

    /// Whether the enumerator ran past either end of the tree.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[inline]
    fn exhaust<T>(&mut self) -> Option<T> {
        self.exhausted = true;
        self.leaf = None;
        None
    }

    /// Moves from the current slot to the adjacent one.
    fn step<V>(&mut self, index: &TreeIndex<K, V>, forward: bool) {
        let Some(leaf) = self.leaf else {
            self.exhausted = true;
            return;
        };
        let page = index.leaf(leaf);

        if forward {
            if self.index + 1 < page.count() {
                self.index += 1;
            } else {
                self.leaf = page.next;
                self.index = 0;
            }
        } else if self.index > 0 {
            self.index -= 1;
        } else {
            self.leaf = page.prev;
            self.index = self.leaf.map_or(0, |prev| index.leaf(prev).count() - 1);
        }

        if self.leaf.is_none() {
            self.exhausted = true;
        }
    }
}

impl<K> Enumerator<K>
where
    K: Clone,
{
    /// Yields the next entry in ascending key order, or `None` once past the last entry.
    #[inline]
    pub fn next<'a, V, C>(&mut self, tree: &'a BPTree<K, V, C>) -> Option<(&'a K, &'a V)>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        self.advance(tree, true)
    }

    /// Yields the next entry in descending key order, or `None` once past the first entry.
    #[inline]
    pub fn prev<'a, V, C>(&mut self, tree: &'a BPTree<K, V, C>) -> Option<(&'a K, &'a V)>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        self.advance(tree, false)
    }

    fn advance<'a, V, C>(&mut self, tree: &'a BPTree<K, V, C>, forward: bool) -> Option<(&'a K, &'a V)>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        if self.exhausted {
            return None;
        }
        assert_eq!(
            self.tree, tree.id,
            "the enumerator was created by another tree"
        );

        if self.version != tree.version && !self.resync(tree, forward) {
            return None;
        }

        // A position in a gap stands for the successor of `key`, going backwards starts from
        // its predecessor instead.
        if !forward && self.gap {
            self.gap = false;
            self.step(&tree.index, false);
            if self.exhausted {
                return self.exhaust();
            }
        }

        // A seek may stop past the last entry of a leaf, which is the first entry of the next.
        let leaf = match self.leaf {
            Some(leaf) if self.index >= tree.index.leaf(leaf).count() => {
                self.index = 0;
                tree.index.leaf(leaf).next
            }
            leaf => leaf,
        };
        let Some(leaf) = leaf else {
            return self.exhaust();
        };
        self.leaf = Some(leaf);

        let (key, value) = tree.index.leaf(leaf).entry(self.index).pair();
        self.key = key.clone();
        self.hit = false;
        self.gap = false;
        self.step(&tree.index, forward);
        Some((key, value))
    }

    /// Re-seeks the stored key after the tree was modified. Returns `false` if that leaves
    /// nothing to yield in the direction of travel.
    fn resync<V, C>(&mut self, tree: &BPTree<K, V, C>, forward: bool) -> bool
    where
        C: Fn(&K, &K) -> Ordering,
    {
        let (leaf, index, found) = tree.seek_position(&self.key);

        // Move off the re-found slot once, unless it holds the key that is still due. Going
        // backwards from a miss, the slot is the successor of the key, which is behind us.
        let skip = if forward {
            found && !self.hit
        } else {
            !(found && self.hit)
        };

        self.leaf = leaf;
        self.index = index;
        self.version = tree.version;
        self.hit = found && !skip;
        self.gap = false;
        if skip {
            self.step(&tree.index, forward);
        }
        !self.exhausted
    }
}

impl<K, V, C> BPTree<K, V, C>
where
    K: Clone,
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an enumerator positioned at `key`, or at the place `key` would take if it's
    /// absent. Returns whether `key` exists.
    ///
    /// Going forward, the enumerator first yields `key` if it exists, or else its successor.
    /// Going backward, it first yields `key` if it exists, or else its predecessor.
    pub fn seek(&self, key: &K) -> (Enumerator<K>, bool) {
        let (leaf, index, found) = self.seek_position(key);
        (Enumerator::new(self, leaf, index, key.clone(), found), found)
    }

    /// Creates an enumerator positioned at the first entry, or `None` if the tree is empty.
    pub fn seek_first(&self) -> Option<Enumerator<K>> {
        let leaf = self.first?;
        let key = self.index.leaf(leaf).first_key().clone();
        Some(Enumerator::new(self, Some(leaf), 0, key, true))
    }

    /// Creates an enumerator positioned at the last entry, or `None` if the tree is empty.
    pub fn seek_last(&self) -> Option<Enumerator<K>> {
        let leaf = self.last?;
        let page = self.index.leaf(leaf);
        let index = page.count() - 1;
        let key = page.entry(index).key.clone();
        Some(Enumerator::new(self, Some(leaf), index, key, true))
    }
}

impl<K, V, C> BPTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// The slot of `key`, or of its successor if `key` is absent, and whether `key` exists.
    fn seek_position(&self, key: &K) -> (Option<PageId>, usize, bool) {
        let Some(mut node) = self.root else {
            return (None, 0, false);
        };
        loop {
            match (self.index.find(node, key, &self.cmp), node) {
                (Ok(index), _) => {
                    let (leaf, index) = self.slot(node, index);
                    break (Some(leaf), index, true);
                }
                (Err(index), Node::Branch(id)) => node = self.index.branch(id).child(index),
                (Err(index), Node::Leaf(id)) => break (Some(id), index, false),
            }
        }
    }
}

impl<K, V, C> BPTree<K, V, C> {
    /// An iterator over the entries in key order.
    ///
    /// Unlike an [`Enumerator`], it borrows the tree, so the tree can't change under it.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            index: &self.index,
            front: self.first.map(|id| (id, 0)),
            back: self.last.map(|id| (id, self.index.leaf(id).count() - 1)),
            remaining: self.len,
        }
    }
}

/// An iterator over the entries of a [`BPTree`], created by [`BPTree::iter`].
pub struct Iter<'a, K, V> {
    index: &'a TreeIndex<K, V>,
    front: Option<(PageId, usize)>,
    back: Option<(PageId, usize)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index: &'a TreeIndex<K, V> = self.index;
        let (leaf, slot) = self.front?;
        let page = index.leaf(leaf);

        self.front = if slot + 1 < page.count() {
            Some((leaf, slot + 1))
        } else {
            page.next.map(|next| (next, 0))
        };
        self.remaining -= 1;
        Some(page.entry(slot).pair())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index: &'a TreeIndex<K, V> = self.index;
        let (leaf, slot) = self.back?;
        let page = index.leaf(leaf);

        self.back = if slot > 0 {
            Some((leaf, slot - 1))
        } else {
            page.prev.map(|prev| (prev, index.leaf(prev).count() - 1))
        };
        self.remaining -= 1;
        Some(page.entry(slot).pair())
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, C> IntoIterator for &'a BPTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
