//! The allocator capability every bas-* container is parameterized over.
//!
//! # Modules
//!
//! - [`block`]: `MemoryBlock`, the `(pointer, size, alignment)` triple handed out by
//!   allocators
//! - [`raw`]: `RawAllocator`, the stateless heap allocator used by default
//! - [`tracking`]: `TrackingAllocator`, an instrumented wrapper that counts allocations

use bas_common::Result;

pub mod block;
pub mod raw;
pub mod tracking;

pub use block::MemoryBlock;
pub use raw::RawAllocator;
pub use tracking::{AllocationStats, TrackingAllocator};

/// Aligned allocate/free capability.
///
/// Allocators are cheap handles: containers store their own instance and pass it
/// (by reference) into every operation that may need storage. Multiple containers may
/// hold independent instances without coordination.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - A block returned by `try_allocate`/`allocate` is valid for reads and writes of
///   `size` bytes and stays valid until it is passed to `free` on the same allocator
///   (or, for allocators that never reclaim individual blocks, until the allocator
///   itself is dropped).
/// - The block address is a multiple of the requested alignment.
/// - Blocks returned by distinct calls do not overlap.
///
/// There is no requirement that `size` be a multiple of `alignment`.
pub unsafe trait Allocator {
    /// Attempts to allocate a block of at least `size` bytes aligned to `alignment`.
    ///
    /// Returns `InvalidArgument` if `alignment` is not a power of two, and
    /// `AllocationFailed` if the request cannot be satisfied.
    fn try_allocate(&self, size: usize, alignment: usize) -> Result<MemoryBlock>;

    /// Releases a block previously returned by this allocator.
    ///
    /// # Safety
    ///
    /// `block` must have been produced by this allocator instance (or a clone sharing
    /// its state) and must not have been freed already.
    unsafe fn free(&self, block: MemoryBlock);

    /// Allocates a block of at least `size` bytes aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two. Aborts the process through
    /// [`std::alloc::handle_alloc_error`] when the allocator is exhausted.
    #[inline]
    fn allocate(&self, size: usize, alignment: usize) -> MemoryBlock {
        assert!(
            bas_align::is_power_of_two(alignment) && alignment != 0,
            "alignment must be a power of two: {alignment}"
        );
        match self.try_allocate(size, alignment) {
            Ok(block) => block,
            Err(e) => allocation_failure(e, size, alignment),
        }
    }
}

#[cold]
#[inline(never)]
fn allocation_failure(e: bas_common::error::Error, size: usize, alignment: usize) -> ! {
    if e.is_allocation_failure() {
        if let Ok(layout) = std::alloc::Layout::from_size_align(size, alignment) {
            std::alloc::handle_alloc_error(layout);
        }
    }
    panic!("{e}");
}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn try_allocate(&self, size: usize, alignment: usize) -> Result<MemoryBlock> {
        (**self).try_allocate(size, alignment)
    }

    #[inline]
    unsafe fn free(&self, block: MemoryBlock) {
        unsafe { (**self).free(block) }
    }

    #[inline]
    fn allocate(&self, size: usize, alignment: usize) -> MemoryBlock {
        (**self).allocate(size, alignment)
    }
}

#[cfg(test)]
mod tests;
