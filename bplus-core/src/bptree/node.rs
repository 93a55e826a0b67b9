use crate::storage::PageId;

/// A reference to a page of the tree, tagged with the kind of page it refers to.
///
/// Leaves and index pages live in separate arenas, so the tag tells which arena the id
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node {
    Leaf(PageId),
    Branch(PageId),
}

impl Node {
    #[inline]
    pub(crate) fn leaf(self) -> Option<PageId> {
        match self {
            Self::Leaf(id) => Some(id),
            Self::Branch(_) => None,
        }
    }

    #[inline]
    pub(crate) fn branch(self) -> Option<PageId> {
        match self {
            Self::Branch(id) => Some(id),
            Self::Leaf(_) => None,
        }
    }
}
