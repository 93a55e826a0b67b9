use crate::{bptree::node::Node, storage::PageId, KX};

/// An index page.
///
/// It holds `count` separators and `count + 1` children. The child at `index` covers the keys
/// before the separator at `index`, and the child at `index + 1` the keys from it on.
///
/// A separator doesn't store a key. It's the id of the leftmost leaf of its right-hand child,
/// and its effective key is that leaf's current first key. Moving entries in or out of the
/// front of that leaf moves the separator along with no bookkeeping.
pub(crate) struct Branch {
    separators: Vec<PageId>,
    children: Vec<Node>,
}

impl Branch {
    /// The maximum number of separators an index page holds between two operations.
    pub(crate) const CAPACITY: usize = 2 * KX + 1;

    /// Creates an index page with a single child and no separator.
    #[inline]
    pub(crate) fn new(first: Node) -> Self {
        let mut children = Vec::with_capacity(Self::CAPACITY + 1);
        children.push(first);
        Self {
            separators: Vec::with_capacity(Self::CAPACITY),
            children,
        }
    }

    /// Creates a root index page over two children.
    #[inline]
    pub(crate) fn new_root(left: Node, separator: PageId, right: Node) -> Self {
        let mut branch = Self::new(left);
        branch.insert(0, separator, right);
        branch
    }

    /// The number of separators.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.separators.len()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Node {
        self.children[index]
    }

    #[inline]
    pub(crate) fn children(&self) -> &[Node] {
        &self.children
    }

    #[inline]
    pub(crate) fn separator(&self, index: usize) -> PageId {
        self.separators[index]
    }

    #[inline]
    pub(crate) fn set_separator(&mut self, index: usize, separator: PageId) {
        self.separators[index] = separator;
    }

    /// The children directly before and after the child at `index`.
    #[inline]
    pub(crate) fn siblings(&self, index: usize) -> (Option<Node>, Option<Node>) {
        let prev = index.checked_sub(1).map(|i| self.children[i]);
        let next = self.children.get(index + 1).copied();
        (prev, next)
    }

    /// Inserts `separator` at `index` and `child` right after it.
    #[inline]
    pub(crate) fn insert(&mut self, index: usize, separator: PageId, child: Node) {
        self.separators.insert(index, separator);
        self.children.insert(index + 1, child);
    }

    /// Removes the separator at `index` together with the child after it.
    #[inline]
    pub(crate) fn remove(&mut self, index: usize) -> (PageId, Node) {
        let separator = self.separators.remove(index);
        let child = self.children.remove(index + 1);
        (separator, child)
    }

    /// Splits the page in two halves, returning the middle separator and the upper half.
    pub(crate) fn split(&mut self) -> (PageId, Self) {
        let mid = self.count() / 2;

        let mut upper = Self::new(self.children[mid + 1]);
        upper.separators.extend(self.separators.drain(mid + 1..));
        upper.children.extend(self.children.drain(mid + 2..));
        self.children.truncate(mid + 1);

        let separator = self.separators.pop().expect("a split page cannot be empty");
        (separator, upper)
    }

    /// Appends `separator` and then every separator and child of `right` to the page.
    pub(crate) fn append(&mut self, separator: PageId, right: Self) {
        self.separators.push(separator);
        self.separators.extend(right.separators);
        self.children.extend(right.children);
    }

    /// Prepends a child, keyed by `separator` which becomes the first separator.
    #[inline]
    pub(crate) fn push_front(&mut self, child: Node, separator: PageId) {
        self.children.insert(0, child);
        self.separators.insert(0, separator);
    }

    /// Appends a child, keyed by `separator`.
    #[inline]
    pub(crate) fn push_back(&mut self, separator: PageId, child: Node) {
        self.separators.push(separator);
        self.children.push(child);
    }

    /// Takes the first child together with the separator after it.
    #[inline]
    pub(crate) fn pop_front(&mut self) -> (Node, PageId) {
        (self.children.remove(0), self.separators.remove(0))
    }

    /// Takes the last separator together with the child after it.
    #[inline]
    pub(crate) fn pop_back(&mut self) -> (PageId, Node) {
        let separator = self.separators.pop().expect("the page has no separator");
        let child = self.children.pop().expect("the page has no child");
        (separator, child)
    }
}
