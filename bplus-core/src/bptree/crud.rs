use std::{cmp::Ordering, mem};

use log::debug;

use crate::{
    bptree::{entry::Entry, leaf::Leaf, node::Node, BPTree},
    storage::PageId,
    KD, KX,
};

impl<K, V, C> BPTree<K, V, C> {
    /// The number of entries in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The first entry in key order, or `None` if the tree is empty.
    #[inline]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.first.map(|id| self.index.leaf(id).entry(0).pair())
    }

    /// The last entry in key order, or `None` if the tree is empty.
    #[inline]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.last.map(|id| {
            let leaf = self.index.leaf(id);
            leaf.entry(leaf.count() - 1).pair()
        })
    }

    /// Removes all entries from the tree.
    pub fn clear(&mut self) {
        if self.root.is_none() {
            return;
        }

        debug!("clearing a tree of {} entries", self.len);
        self.index.clear();
        self.reset();
        self.version += 1;
    }

    #[inline]
    fn reset(&mut self) {
        self.root = None;
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    /// The entry slot of an exact search hit at `index` within `node`.
    #[inline]
    pub(super) fn slot(&self, node: Node, index: usize) -> (PageId, usize) {
        match node {
            Node::Leaf(id) => (id, index),
            // The separator's leaf starts with the key.
            Node::Branch(id) => (self.index.branch(id).separator(index), 0),
        }
    }

    #[inline]
    pub(super) fn insert_entry(&mut self, leaf: PageId, index: usize, entry: Entry<K, V>) {
        self.index.leaf_mut(leaf).insert(index, entry);
        self.len += 1;
    }

    #[inline]
    pub(super) fn extract_entry(&mut self, leaf: PageId, index: usize) -> Entry<K, V> {
        self.len -= 1;
        self.index.leaf_mut(leaf).remove(index)
    }

    fn init_root(&mut self, entry: Entry<K, V>) {
        let id = self.index.alloc_leaf(Leaf::new());
        self.root = Some(Node::Leaf(id));
        self.first = Some(id);
        self.last = Some(id);
        self.insert_entry(id, 0, entry);
    }
}

impl<K, V, C> BPTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Get the value associated with a given key.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.locate(key)
            .map(|(leaf, index)| &self.index.leaf(leaf).entry(index).value)
    }

    /// Check if the tree contains a given key.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Sets the value associated with `key`, returning the value it replaces, if any.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.version += 1;

        let Some(mut node) = self.root else {
            self.init_root(Entry::new(key, value));
            return None;
        };

        // The index page the descent came from, and the position of `node` among its children.
        let mut parent = None;
        loop {
            let index = match self.index.find(node, &key, &self.cmp) {
                Ok(index) => {
                    let (leaf, index) = self.slot(node, index);
                    let entry = self.index.leaf_mut(leaf).entry_mut(index);
                    return Some(mem::replace(&mut entry.value, value));
                }
                Err(index) => index,
            };

            match node {
                Node::Branch(id) => {
                    // Split full pages on the way down, so that a split below always has a
                    // parent with room for one more separator.
                    let (id, index) = if self.index.branch(id).count() > 2 * KX {
                        self.split_branch(parent, id, index)
                    } else {
                        (id, index)
                    };
                    parent = Some((id, index));
                    node = self.index.branch(id).child(index);
                }
                Node::Leaf(id) => {
                    let entry = Entry::new(key, value);
                    if self.index.leaf(id).is_full() {
                        self.overflow(parent, id, index, entry);
                    } else {
                        self.insert_entry(id, index, entry);
                    }
                    return None;
                }
            }
        }
    }

    /// Combines [`get`](Self::get) and [`set`](Self::set).
    ///
    /// `update` receives the current value of `key` (`None` if absent) and returns the value to
    /// write, or `None` to leave the tree untouched. Returns the value that got overwritten, if
    /// any, and whether a write happened. When `update` declines to write, the current value
    /// stays in the tree and the first element is `None`; `update` has already seen it by
    /// reference.
    ///
    /// A new key takes a second descent to insert it. Locating first keeps a declined write
    /// from splitting pages on the way down.
    ///
    /// `tree.set(k, v)` conceptually equals `tree.put(k, |_| Some(v))`, modulo the differing
    /// return values.
    pub fn put<F>(&mut self, key: K, update: F) -> (Option<V>, bool)
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        match self.locate(&key) {
            Some((leaf, index)) => {
                let entry = self.index.leaf_mut(leaf).entry_mut(index);
                let Some(value) = update(Some(&entry.value)) else {
                    return (None, false);
                };
                self.version += 1;
                (Some(mem::replace(&mut entry.value, value)), true)
            }
            None => match update(None) {
                Some(value) => {
                    self.set(key, value);
                    (None, true)
                }
                None => (None, false),
            },
        }
    }

    /// Deletes the entry of a given key, returning whether it existed.
    #[inline]
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Removes the entry of a given key and returns it.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let mut node = self.root?;
        let mut parent = None;
        let mut restructured = false;

        let removed = loop {
            let found = self.index.find(node, key, &self.cmp);

            let id = match node {
                Node::Branch(id) => id,
                Node::Leaf(id) => {
                    let Ok(index) = found else {
                        break None;
                    };
                    let entry = self.extract_entry(id, index);

                    if self.index.leaf(id).count() < KD {
                        match parent {
                            Some((parent, position)) => self.underflow_leaf(parent, position, id),
                            None if self.len == 0 => {
                                self.index.clear();
                                self.reset();
                            }
                            // The root may hold any number of entries.
                            None => {}
                        }
                    }
                    break Some(entry);
                }
            };

            // `key` is the first entry of the separator's leaf, which can give it up right away
            // if it has entries to spare.
            if let Ok(index) = found {
                let leaf = self.index.branch(id).separator(index);
                if self.index.leaf(leaf).count() > KD {
                    break Some(self.extract_entry(leaf, 0));
                }
            }

            let (Ok(index) | Err(index)) = found;
            // Fill pages on the way down, so that a merge below can always take a separator
            // from its parent.
            let (id, index) = match parent {
                Some((parent, position)) if self.index.branch(id).count() <= KX => {
                    restructured = true;
                    self.underflow_branch(parent, position, id, index)
                }
                _ => (id, index),
            };

            // A separator hit continues into the child on its right.
            let child = if found.is_ok() { index + 1 } else { index };
            parent = Some((id, child));
            node = self.index.branch(id).child(child);
        };

        if removed.is_some() || restructured {
            self.version += 1;
        }
        removed.map(Entry::into_pair)
    }

    /// Finds the entry slot of `key`.
    fn locate(&self, key: &K) -> Option<(PageId, usize)> {
        let mut node = self.root?;
        loop {
            match (self.index.find(node, key, &self.cmp), node) {
                (Ok(index), _) => break Some(self.slot(node, index)),
                (Err(index), Node::Branch(id)) => node = self.index.branch(id).child(index),
                (Err(_), Node::Leaf(_)) => break None,
            }
        }
    }
}
