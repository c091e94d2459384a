//! Alignment arithmetic with overflow reporting.

/// Aligns a number up to the next multiple of the specified alignment.
///
/// Returns `None` if the aligned value does not fit in `usize`.
///
/// # Examples
///
/// ```
/// use polyadicts_bytes::align::checked_align_up;
///
/// assert_eq!(checked_align_up(0, 8), Some(0));
/// assert_eq!(checked_align_up(1, 8), Some(8));
/// assert_eq!(checked_align_up(8, 8), Some(8));
/// assert_eq!(checked_align_up(9, 8), Some(16));
/// assert_eq!(checked_align_up(usize::MAX, 8), None);
/// ```
///
/// # Panics
///
/// This function will panic in debug builds if `alignment` is not a power of 2.
#[inline]
pub fn checked_align_up(n: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    n.checked_add(alignment - 1).map(|n| n & !(alignment - 1))
}

/// Aligns a number down to the previous multiple of the specified alignment.
///
/// ```
/// use polyadicts_bytes::align::align_down;
///
/// assert_eq!(align_down(7, 8), 0);
/// assert_eq!(align_down(15, 8), 8);
/// assert_eq!(align_down(16, 8), 16);
/// ```
#[inline]
pub fn align_down(n: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    n & !(alignment - 1)
}

/// Checks if a number is aligned to the specified alignment boundary.
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}
