//! Alignment helpers shared by the block manager and slot layout

/// Aligns a value up to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use blockpool::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline(always)]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use blockpool::utils::is_aligned;
///
/// assert!(is_aligned(16, 8));
/// assert!(!is_aligned(17, 8));
/// ```
#[inline(always)]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Calculates padding needed to align a value
///
/// # Examples
/// ```
/// use blockpool::utils::padding_needed;
///
/// assert_eq!(padding_needed(7, 8), 1);
/// assert_eq!(padding_needed(8, 8), 0);
/// assert_eq!(padding_needed(9, 8), 7);
/// ```
#[inline(always)]
pub const fn padding_needed(value: usize, alignment: usize) -> usize {
    align_up(value, alignment) - value
}

/// Check if a pointer is properly aligned
#[inline(always)]
pub fn is_aligned_ptr<T>(ptr: *const T, alignment: usize) -> bool {
    is_aligned(ptr as usize, alignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_round_trips_with_align_up() {
        for align in [1, 2, 8, 64] {
            for value in 0..200 {
                assert_eq!(value + padding_needed(value, align), align_up(value, align));
                assert!(is_aligned(align_up(value, align), align));
            }
        }
    }

    #[test]
    fn pointer_alignment() {
        let word = 0u64;
        assert!(is_aligned_ptr(&raw const word, core::mem::align_of::<u64>()));
    }
}
