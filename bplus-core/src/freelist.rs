use crate::storage::PageId;

/// Represents a free list that keeps track of recycled page slots in a page arena.
///
/// Freelist uses a bitmap to record the ids of free slots, each bit in the bitmap
/// represents whether a slot is free (1) or not (0).
#[derive(Default)]
#[repr(transparent)]
pub(crate) struct Freelist {
    bitmap: Vec<BitmapWord>,
}

type BitmapWord = u64;

impl Freelist {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The number of free slots in the free list.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bitmap
            .iter()
            .fold(0, |acc, word| acc + word.count_ones() as usize)
    }

    /// Marks the specified slot as free.
    pub(crate) fn free(&mut self, page_id: PageId) {
        let word_idx = (page_id.raw() / BitmapWord::BITS) as usize;

        // Automatically resize the Vec of words.
        if word_idx >= self.bitmap.len() {
            self.bitmap.resize(word_idx + 1, 0);
        }

        let bit = 1 << (page_id.raw() % BitmapWord::BITS);
        debug_assert_eq!(self.bitmap[word_idx] & bit, 0, "double free of {page_id:?}");
        self.bitmap[word_idx] |= bit;
    }

    /// Takes a single slot from the free list, preferring the highest id.
    pub(crate) fn take(&mut self) -> Option<PageId> {
        let (word_idx, word) = self
            .bitmap
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != 0)?;

        let idx = BitmapWord::BITS - word.leading_zeros() - 1;
        *word &= !(1 << idx);

        // Trailing empty words are useless, drop them so the scan above stays short.
        while self.bitmap.last() == Some(&0) {
            self.bitmap.pop();
        }

        Some((word_idx as u32 * BitmapWord::BITS + idx).into())
    }
}

#[cfg(test)]
impl<const N: usize> From<[BitmapWord; N]> for Freelist {
    fn from(value: [BitmapWord; N]) -> Self {
        Self {
            bitmap: value.to_vec(),
        }
    }
}
