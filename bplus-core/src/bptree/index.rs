use std::cmp::Ordering;

use crate::{
    bptree::{branch::Branch, leaf::Leaf, node::Node, search::SearchIndex},
    storage::{Arena, PageId},
};

/// Acts as a bridge between the B+ Tree and the pages it owns.
///
/// Leaves and index pages are kept in two arenas. The tree reaches every page through here,
/// which keeps page lifetime in one place: `clear` drops the whole page graph in bulk.
pub(crate) struct TreeIndex<K, V> {
    leaves: Arena<Leaf<K, V>>,
    branches: Arena<Branch>,
}

impl<K, V> TreeIndex<K, V> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            leaves: Arena::new(),
            branches: Arena::new(),
        }
    }

    #[inline]
    pub(crate) fn leaf(&self, id: PageId) -> &Leaf<K, V> {
        self.leaves.get(id)
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: PageId) -> &mut Leaf<K, V> {
        self.leaves.get_mut(id)
    }

    #[inline]
    pub(crate) fn leaf_pair_mut(
        &mut self,
        a: PageId,
        b: PageId,
    ) -> (&mut Leaf<K, V>, &mut Leaf<K, V>) {
        self.leaves.pair_mut(a, b)
    }

    #[inline]
    pub(crate) fn branch(&self, id: PageId) -> &Branch {
        self.branches.get(id)
    }

    #[inline]
    pub(crate) fn branch_mut(&mut self, id: PageId) -> &mut Branch {
        self.branches.get_mut(id)
    }

    #[inline]
    pub(crate) fn branch_pair_mut(&mut self, a: PageId, b: PageId) -> (&mut Branch, &mut Branch) {
        self.branches.pair_mut(a, b)
    }

    #[inline]
    pub(crate) fn alloc_leaf(&mut self, leaf: Leaf<K, V>) -> PageId {
        self.leaves.alloc(leaf)
    }

    #[inline]
    pub(crate) fn alloc_branch(&mut self, branch: Branch) -> PageId {
        self.branches.alloc(branch)
    }

    #[inline]
    pub(crate) fn free_leaf(&mut self, id: PageId) -> Leaf<K, V> {
        self.leaves.free(id)
    }

    #[inline]
    pub(crate) fn free_branch(&mut self, id: PageId) -> Branch {
        self.branches.free(id)
    }

    /// The number of live leaves and index pages.
    #[inline]
    pub(crate) fn page_counts(&self) -> (usize, usize) {
        (self.leaves.len(), self.branches.len())
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.leaves.clear();
        self.branches.clear();
    }

    /// The effective key of a separator.
    #[inline]
    pub(crate) fn separator_key(&self, separator: PageId) -> &K {
        self.leaf(separator).first_key()
    }

    /// Binary searches `key` within a page.
    ///
    /// For an index page, `Ok(index)` means that `key` equals the separator at `index` (so it
    /// is the first entry of that separator's leaf), and `Err(index)` is the child to descend
    /// into.
    pub(crate) fn find<C>(&self, node: Node, key: &K, cmp: &C) -> SearchIndex
    where
        C: Fn(&K, &K) -> Ordering,
    {
        match node {
            Node::Leaf(id) => self.leaf(id).search(key, cmp),
            Node::Branch(id) => {
                let branch = self.branch(id);
                search!(branch.count(), idx => {
                    cmp(key, self.separator_key(branch.separator(idx)))
                })
            }
        }
    }

    /// The leftmost leaf below `node`.
    pub(crate) fn leftmost_leaf(&self, mut node: Node) -> PageId {
        loop {
            match node {
                Node::Leaf(id) => break id,
                Node::Branch(id) => node = self.branch(id).child(0),
            }
        }
    }
}
