use crate::freelist::Freelist;

/// A unique identifier for a page in a page [`Arena`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PageId(u32);

impl PageId {
    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub(crate) const fn raw(&self) -> u32 {
        self.0
    }

    #[inline]
    fn slot(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for PageId {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Represents the storage of one kind of page and is responsible for page lifetime.
///
/// Pages are addressed by [`PageId`]. Nothing outside the arena owns a page, so links between
/// pages are plain ids and freeing a page never leaves a dangling pointer behind, only an id
/// that the owner must stop using. Freed slots are recycled through a [`Freelist`].
pub(crate) struct Arena<P> {
    slots: Vec<Option<P>>,
    freelist: Freelist,
}

impl<P> Default for Arena<P> {
    #[inline]
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            freelist: Freelist::new(),
        }
    }
}

impl<P> Arena<P> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The number of live pages.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.freelist.len()
    }

    pub(crate) fn alloc(&mut self, page: P) -> PageId {
        if let Some(id) = self.freelist.take() {
            self.slots[id.slot()] = Some(page);
            return id;
        }

        let id = PageId::from_raw(
            self.slots
                .len()
                .try_into()
                .expect("the number of pages cannot exceed u32::MAX"),
        );
        self.slots.push(Some(page));
        id
    }

    pub(crate) fn free(&mut self, id: PageId) -> P {
        let page = self.slots[id.slot()]
            .take()
            .expect("the page has already been freed");
        self.freelist.free(id);
        page
    }

    #[inline]
    pub(crate) fn get(&self, id: PageId) -> &P {
        self.slots[id.slot()]
            .as_ref()
            .expect("the page id should not be dangling")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: PageId) -> &mut P {
        self.slots[id.slot()]
            .as_mut()
            .expect("the page id should not be dangling")
    }

    /// Obtain two distinct pages mutably at the same time.
    pub(crate) fn pair_mut(&mut self, a: PageId, b: PageId) -> (&mut P, &mut P) {
        assert_ne!(a, b, "cannot borrow the same page twice");

        let (a_slot, b_slot) = if a < b {
            let (head, tail) = self.slots.split_at_mut(b.slot());
            (&mut head[a.slot()], &mut tail[0])
        } else {
            let (head, tail) = self.slots.split_at_mut(a.slot());
            (&mut tail[0], &mut head[b.slot()])
        };

        (
            a_slot.as_mut().expect("the page id should not be dangling"),
            b_slot.as_mut().expect("the page id should not be dangling"),
        )
    }

    /// Drops every page at once.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.freelist = Freelist::new();
    }
}
