/// Result of a binary search algorithm.
///
/// # Cases
///
/// * `Ok(index)` - The index of the key if found.
/// * `Err(index)` - The index where the key should be inserted.
pub(crate) type SearchIndex = Result<usize, usize>;

/// Generates code for a binary search algorithm that searches for a key in a sorted collection.
///
/// Returns the index of the key if found, or and error indicating where the key should be
/// inserted to maintain a sorted order.
///
/// # Arguments
///
/// * `len` - The length of the collection.
/// * `compare` - An expression that takes an index and returns the [`Ordering`] of the searched
///   key relative to the record at that index (i.e., `cmp(key, record)`).
///
/// [`Ordering`]: std::cmp::Ordering
///
/// # Examples
///
/// ```
/// use bplus::search;
///
/// let slice = &[0, 2, 4, 6, 8];
///
/// assert_eq!(
///     Ok(1),
///     search!(slice.len(), idx => 2i32.cmp(&slice[idx])),
/// );
/// assert_eq!(
///     Err(2),
///     search!(slice.len(), idx => 3i32.cmp(&slice[idx])),
/// );
/// ```
#[macro_export]
macro_rules! search {
    ($len:expr, $index:ident => $compare:expr) => {{
        let mut result = None;
        let mut range = 0..$len;

        while !range.is_empty() {
            let $index = (range.start + range.end) / 2;

            match $compare {
                ::std::cmp::Ordering::Greater => range.start = $index + 1,
                ::std::cmp::Ordering::Less => range.end = $index,
                ::std::cmp::Ordering::Equal => {
                    result = Some($index);
                    break;
                }
            }
        }

        result.ok_or(range.start)
    }};
}
