use log::trace;

use crate::{
    bptree::{branch::Branch, entry::Entry, leaf::Leaf, node::Node, BPTree},
    storage::PageId,
    KD, KX,
};

/// The index page above a page, and the position of that page among its children.
pub(super) type Parent = Option<(PageId, usize)>;

impl<K, V, C> BPTree<K, V, C> {
    /// Inserts `entry` at `index` of the full leaf `id`.
    ///
    /// A neighbour with room takes one entry over first, and the leaf only splits when both
    /// neighbours are full too. That keeps leaves well filled under sequential inserts.
    pub(super) fn overflow(&mut self, parent: Parent, id: PageId, index: usize, entry: Entry<K, V>) {
        let (left, right) = match parent {
            Some((parent, position)) => self.index.branch(parent).siblings(position),
            None => (None, None),
        };
        let left = left
            .and_then(Node::leaf)
            .filter(|&left| !self.index.leaf(left).is_full());
        let right = right
            .and_then(Node::leaf)
            .filter(|&right| !self.index.leaf(right).is_full());

        if let Some(left) = left {
            // The entry doesn't go before the first key, or the descent would have picked
            // the left neighbour.
            debug_assert!(index > 0);
            let (left, leaf) = self.index.leaf_pair_mut(left, id);
            Leaf::shift_left(left, leaf, 1);
            self.insert_entry(id, index - 1, entry);
        } else if let Some(right) = right {
            if index < Leaf::<K, V>::CAPACITY {
                let (leaf, right) = self.index.leaf_pair_mut(id, right);
                Leaf::shift_right(leaf, right, 1);
                self.insert_entry(id, index, entry);
            } else {
                self.insert_entry(right, 0, entry);
            }
        } else {
            self.split_leaf(parent, id, index, entry);
        }
    }

    fn split_leaf(&mut self, parent: Parent, id: PageId, index: usize, entry: Entry<K, V>) {
        let upper = self.index.leaf_mut(id).split_off(id, KD);
        let next = upper.next;
        let right = self.index.alloc_leaf(upper);

        match next {
            Some(next) => self.index.leaf_mut(next).prev = Some(right),
            None => self.last = Some(right),
        }
        self.index.leaf_mut(id).next = Some(right);
        trace!("split leaf {:?} into {:?}", id, right);

        // The new leaf's first key is its own separator.
        match parent {
            Some((parent, position)) => {
                self.index
                    .branch_mut(parent)
                    .insert(position, right, Node::Leaf(right));
            }
            None => self.grow_root(Node::Leaf(id), right, Node::Leaf(right)),
        }

        if index > KD {
            self.insert_entry(right, index - KD, entry);
        } else {
            self.insert_entry(id, index, entry);
        }
    }

    /// Splits the full index page `id`, returning where the child at `index` ended up.
    pub(super) fn split_branch(
        &mut self,
        parent: Parent,
        id: PageId,
        index: usize,
    ) -> (PageId, usize) {
        let (separator, upper) = self.index.branch_mut(id).split();
        let mid = self.index.branch(id).count();
        let right = self.index.alloc_branch(upper);
        trace!("split index page {:?} into {:?}", id, right);

        match parent {
            Some((parent, position)) => {
                self.index
                    .branch_mut(parent)
                    .insert(position, separator, Node::Branch(right));
            }
            None => self.grow_root(Node::Branch(id), separator, Node::Branch(right)),
        }

        if index > mid {
            (right, index - mid - 1)
        } else {
            (id, index)
        }
    }

    fn grow_root(&mut self, left: Node, separator: PageId, right: Node) {
        let root = self
            .index
            .alloc_branch(Branch::new_root(left, separator, right));
        self.root = Some(Node::Branch(root));
        trace!("grew a new root {:?}", root);
    }

    /// Refills the leaf `id`, which dropped below the minimum, from a neighbour or merges it
    /// with one.
    pub(super) fn underflow_leaf(&mut self, parent: PageId, position: usize, id: PageId) {
        let (left, right) = self.index.branch(parent).siblings(position);
        let (left, right) = (left.and_then(Node::leaf), right.and_then(Node::leaf));
        let count = self.index.leaf(id).count();

        let spare_left = left.filter(|&left| self.index.leaf(left).count() + count >= 2 * KD);
        let spare_right = right.filter(|&right| self.index.leaf(right).count() + count >= 2 * KD);

        if let Some(left) = spare_left {
            let (left, leaf) = self.index.leaf_pair_mut(left, id);
            Leaf::shift_right(left, leaf, 1);
        } else if let Some(right) = spare_right {
            let (leaf, right) = self.index.leaf_pair_mut(id, right);
            Leaf::shift_left(leaf, right, 1);
        } else {
            match (left, right) {
                (Some(left), _) => self.merge_leaves(parent, position - 1, left, id),
                (None, Some(right)) => self.merge_leaves(parent, position, id, right),
                (None, None) => unreachable!("a non-root leaf has a neighbour"),
            }
        }
    }

    /// Moves every entry of `right` into `left` and drops `right` together with the separator
    /// at `index` of `parent`.
    fn merge_leaves(&mut self, parent: PageId, index: usize, left: PageId, right: PageId) {
        let mut upper = self.index.free_leaf(right);
        let next = upper.next;

        let leaf = self.index.leaf_mut(left);
        let count = upper.count();
        Leaf::shift_left(leaf, &mut upper, count);
        leaf.next = next;

        match next {
            Some(next) => self.index.leaf_mut(next).prev = Some(left),
            None => self.last = Some(left),
        }
        trace!("merged leaf {:?} into {:?}", right, left);

        self.remove_separator(parent, index, Node::Leaf(left));
    }

    /// Refills the index page `id` on the way down, returning where the child at `index`
    /// ended up.
    pub(super) fn underflow_branch(
        &mut self,
        parent: PageId,
        position: usize,
        id: PageId,
        index: usize,
    ) -> (PageId, usize) {
        let (left, right) = self.index.branch(parent).siblings(position);
        let (left, right) = (left.and_then(Node::branch), right.and_then(Node::branch));

        let spare_left = left.filter(|&left| self.index.branch(left).count() > KX);
        let spare_right = right.filter(|&right| self.index.branch(right).count() > KX);

        if let Some(left) = spare_left {
            // Rotate the last child of the left neighbour through the parent.
            let separator = self.index.branch(parent).separator(position - 1);
            let (left, branch) = self.index.branch_pair_mut(left, id);
            let (up, child) = left.pop_back();
            branch.push_front(child, separator);
            self.index
                .branch_mut(parent)
                .set_separator(position - 1, up);
            return (id, index + 1);
        }

        if let Some(right) = spare_right {
            let separator = self.index.branch(parent).separator(position);
            let (branch, right) = self.index.branch_pair_mut(id, right);
            let (child, up) = right.pop_front();
            branch.push_back(separator, child);
            self.index.branch_mut(parent).set_separator(position, up);
            return (id, index);
        }

        match (left, right) {
            (Some(left), _) => {
                let offset = self.index.branch(left).count() + 1;
                self.merge_branches(parent, position - 1, left, id);
                (left, index + offset)
            }
            (None, Some(right)) => {
                self.merge_branches(parent, position, id, right);
                (id, index)
            }
            (None, None) => unreachable!("a non-root index page has a neighbour"),
        }
    }

    fn merge_branches(&mut self, parent: PageId, index: usize, left: PageId, right: PageId) {
        let separator = self.index.branch(parent).separator(index);
        let upper = self.index.free_branch(right);
        self.index.branch_mut(left).append(separator, upper);
        trace!("merged index page {:?} into {:?}", right, left);

        self.remove_separator(parent, index, Node::Branch(left));
    }

    /// Drops the separator at `index` of `parent` after its right child merged into `merged`.
    fn remove_separator(&mut self, parent: PageId, index: usize, merged: Node) {
        if self.index.branch(parent).count() > 1 {
            self.index.branch_mut(parent).remove(index);
            return;
        }

        // Only the root runs out of separators, and then the merged page takes its place.
        debug_assert_eq!(self.root, Some(Node::Branch(parent)));
        self.index.free_branch(parent);
        self.root = Some(merged);
        trace!("collapsed the root into {:?}", merged);
    }
}
