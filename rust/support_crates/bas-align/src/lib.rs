//! Alignment and power-of-two helpers shared by the allocators and containers.
//!
//! All functions are pure. Functions taking an `alignment` require it to be a non-zero
//! power of two; passing anything else is a caller error and is caught by a debug
//! assertion.

/// Returns `true` if `x` has at most one bit set.
///
/// Zero is treated as a power of two, which lets capacity arithmetic treat an empty
/// buffer uniformly.
///
/// # Examples
///
/// ```
/// use bas_align::is_power_of_two;
///
/// assert!(is_power_of_two(0));
/// assert!(is_power_of_two(1));
/// assert!(is_power_of_two(256));
/// assert!(!is_power_of_two(255));
/// ```
#[inline]
pub const fn is_power_of_two(x: usize) -> bool {
    x & x.wrapping_sub(1) == 0
}

/// Rounds `x` up to the smallest power of two that is greater than or equal to it.
///
/// `0` maps to `0`, so a zero capacity request never allocates.
///
/// # Examples
///
/// ```
/// use bas_align::ceil_power_of_two;
///
/// assert_eq!(ceil_power_of_two(0), 0);
/// assert_eq!(ceil_power_of_two(1), 1);
/// assert_eq!(ceil_power_of_two(5), 8);
/// assert_eq!(ceil_power_of_two(20), 32);
/// assert_eq!(ceil_power_of_two(32), 32);
/// ```
///
/// # Panics
///
/// Panics if the result does not fit into `usize`.
#[inline]
pub fn ceil_power_of_two(x: usize) -> usize {
    checked_ceil_power_of_two(x).expect("capacity overflow")
}

/// Same as [`ceil_power_of_two`], returning `None` instead of panicking on overflow.
#[inline]
pub fn checked_ceil_power_of_two(x: usize) -> Option<usize> {
    if x == 0 {
        Some(0)
    } else {
        x.checked_next_power_of_two()
    }
}

/// Aligns a number up to the next multiple of the specified alignment.
///
/// If the input is already aligned, it is returned unchanged.
///
/// # Examples
///
/// ```
/// use bas_align::align_up;
///
/// assert_eq!(align_up(0, 8), 0);
/// assert_eq!(align_up(1, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// assert_eq!(align_up(10, 4), 12);
/// ```
///
/// # Panics
///
/// This function will panic in debug builds if:
/// - `alignment` is 0
/// - `alignment` is not a power of 2
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n + alignment - 1) & !(alignment - 1)
}

/// Same as [`align_up`], returning `None` if the aligned value does not fit into `usize`.
#[inline]
pub fn checked_align_up(n: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    n.checked_add(alignment - 1).map(|v| v & !(alignment - 1))
}

/// Aligns a number down to the previous multiple of the specified alignment.
///
/// # Examples
///
/// ```
/// use bas_align::align_down;
///
/// assert_eq!(align_down(0, 8), 0);
/// assert_eq!(align_down(7, 8), 0);
/// assert_eq!(align_down(9, 8), 8);
/// assert_eq!(align_down(16, 8), 16);
/// ```
#[inline]
pub fn align_down(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    n & !(alignment - 1)
}

/// Checks if a number is a multiple of the specified alignment.
///
/// # Examples
///
/// ```
/// use bas_align::is_aligned;
///
/// assert!(is_aligned(0, 8));
/// assert!(!is_aligned(7, 8));
/// assert!(is_aligned(16, 8));
/// ```
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}

/// Returns the address of `ptr` as an integer.
#[inline]
pub fn ptr_to_int<T: ?Sized>(ptr: *const T) -> usize {
    ptr.cast::<u8>() as usize
}

/// Checks whether `ptr` lies on an `alignment` boundary.
///
/// # Examples
///
/// ```
/// use bas_align::is_ptr_aligned;
///
/// let value = 0u64;
/// assert!(is_ptr_aligned(&value as *const u64, std::mem::align_of::<u64>()));
/// ```
///
/// # Panics
///
/// Panics if `alignment` is not a power of two.
#[inline]
pub fn is_ptr_aligned<T: ?Sized>(ptr: *const T, alignment: usize) -> bool {
    assert!(
        alignment != 0 && is_power_of_two(alignment),
        "alignment must be a power of two: {alignment}"
    );
    is_aligned(ptr_to_int(ptr), alignment)
}
