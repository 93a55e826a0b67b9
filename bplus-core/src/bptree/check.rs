use std::cmp::Ordering;

use thiserror::Error;

use crate::{
    bptree::{branch::Branch, leaf::Leaf, node::Node, BPTree},
    error::Result,
    storage::PageId,
    KD, KX,
};

#[derive(Debug, Error)]
pub(crate) enum Occupancy {
    #[error("leaf {page} holds {count} entries, expected {min}..={max}")]
    Leaf {
        page: u32,
        count: usize,
        min: usize,
        max: usize,
    },
    #[error("index page {page} holds {count} separators, expected {min}..={max}")]
    Branch {
        page: u32,
        count: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Error)]
pub(crate) enum Order {
    #[error("keys are not strictly ascending at slot {index} of leaf {page}")]
    Unsorted { page: u32, index: usize },
    #[error("separator {index} of index page {page} isn't the leftmost leaf of its right child")]
    Separator { page: u32, index: usize },
}

#[derive(Debug, Error)]
pub(crate) enum Linkage {
    #[error("the leaf chain is broken at leaf {page}")]
    Chain { page: u32 },
    #[error("the first or last leaf doesn't match the ends of the chain")]
    Ends,
    #[error("leaf {page} is at depth {depth}, expected {expected}")]
    Depth {
        page: u32,
        depth: usize,
        expected: usize,
    },
    #[error("{leaves} leaves and {branches} index pages are live but unreachable")]
    Leaked { leaves: usize, branches: usize },
}

#[derive(Debug, Error)]
pub(crate) enum Accounting {
    #[error("the tree reports {len} entries but holds {count}")]
    Len { len: usize, count: usize },
}

/// What a walk from the root collects.
#[derive(Default)]
struct Walk {
    leaves: Vec<PageId>,
    branches: usize,
    depth: Option<usize>,
}

impl<K, V, C> BPTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Checks every structural invariant of the tree.
    ///
    /// The tree maintains them on its own, so this exists for tests and debugging. It walks
    /// every page, which makes it O(n).
    pub fn verify(&self) -> Result<()> {
        let mut walk = Walk::default();
        if let Some(root) = self.root {
            self.verify_node(root, 0, true, &mut walk)?;
        }

        let mut prev = None;
        let mut cursor = self.first;
        for &leaf in &walk.leaves {
            let page = self.index.leaf(leaf);
            if cursor != Some(leaf) || page.prev != prev {
                return Err(Linkage::Chain { page: leaf.raw() }.into());
            }
            prev = Some(leaf);
            cursor = page.next;
        }
        if cursor.is_some() || self.last != prev {
            return Err(Linkage::Ends.into());
        }

        let mut count = 0;
        let mut last_key = None;
        for &leaf in &walk.leaves {
            for (index, entry) in self.index.leaf(leaf).entries().iter().enumerate() {
                if let Some(last_key) = last_key {
                    if (self.cmp)(last_key, &entry.key) != Ordering::Less {
                        return Err(Order::Unsorted {
                            page: leaf.raw(),
                            index,
                        }
                        .into());
                    }
                }
                last_key = Some(&entry.key);
                count += 1;
            }
        }
        if count != self.len {
            return Err(Accounting::Len {
                len: self.len,
                count,
            }
            .into());
        }

        let (leaves, branches) = self.index.page_counts();
        if leaves != walk.leaves.len() || branches != walk.branches {
            return Err(Linkage::Leaked {
                leaves: leaves.saturating_sub(walk.leaves.len()),
                branches: branches.saturating_sub(walk.branches),
            }
            .into());
        }
        Ok(())
    }

    fn verify_node(&self, node: Node, depth: usize, is_root: bool, walk: &mut Walk) -> Result<()> {
        match node {
            Node::Leaf(id) => {
                let count = self.index.leaf(id).count();
                let (min, max) = (if is_root { 1 } else { KD }, Leaf::<K, V>::CAPACITY);
                if !(min..=max).contains(&count) {
                    return Err(Occupancy::Leaf {
                        page: id.raw(),
                        count,
                        min,
                        max,
                    }
                    .into());
                }

                match walk.depth {
                    Some(expected) if expected != depth => {
                        return Err(Linkage::Depth {
                            page: id.raw(),
                            depth,
                            expected,
                        }
                        .into());
                    }
                    Some(_) => {}
                    None => walk.depth = Some(depth),
                }
                walk.leaves.push(id);
            }
            Node::Branch(id) => {
                let branch = self.index.branch(id);
                let (min, max) = (if is_root { 1 } else { KX }, Branch::CAPACITY);
                if !(min..=max).contains(&branch.count()) {
                    return Err(Occupancy::Branch {
                        page: id.raw(),
                        count: branch.count(),
                        min,
                        max,
                    }
                    .into());
                }

                walk.branches += 1;
                for (index, &child) in branch.children().iter().enumerate() {
                    if index > 0 && self.index.leftmost_leaf(child) != branch.separator(index - 1) {
                        return Err(Order::Separator {
                            page: id.raw(),
                            index: index - 1,
                        }
                        .into());
                    }
                    self.verify_node(child, depth + 1, false, walk)?;
                }
            }
        }
        Ok(())
    }
}
