//! `MemoryBlock`: a block of memory produced by an [`Allocator`](crate::Allocator).

use std::{alloc::Layout, ptr::NonNull};

/// Represents a block of allocated memory with its size and alignment.
///
/// The block is an opaque receipt: only the allocator that produced it may reclaim it,
/// and it is always reclaimed as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBlock {
    ptr: NonNull<u8>,
    size: usize,
    alignment: usize,
}

impl MemoryBlock {
    /// Creates a block descriptor from its raw parts.
    ///
    /// # Safety
    ///
    /// `ptr` must be aligned to `alignment`, which must be a power of two, and must be
    /// valid for `size` bytes for as long as the block is in use.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, size: usize, alignment: usize) -> MemoryBlock {
        debug_assert!(alignment.is_power_of_two());
        debug_assert!((ptr.as_ptr() as usize).is_multiple_of(alignment));
        MemoryBlock {
            ptr,
            size,
            alignment,
        }
    }

    /// Returns an empty block whose address is `alignment` itself.
    ///
    /// Used for zero-size requests: the pointer is non-null and suitably aligned but
    /// must never be dereferenced.
    #[inline]
    pub fn dangling(alignment: usize) -> MemoryBlock {
        assert!(alignment.is_power_of_two());
        MemoryBlock {
            // SAFETY: a power of two is never zero.
            ptr: unsafe { NonNull::new_unchecked(std::ptr::without_provenance_mut(alignment)) },
            size: 0,
            alignment,
        }
    }

    /// Pointer to the first byte of the block.
    #[inline]
    pub fn ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Size of the block in bytes, as requested.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Layout describing the block.
    #[inline]
    pub fn layout(&self) -> Layout {
        // SAFETY: blocks are only created from sizes and alignments that formed a
        // valid layout when the memory was requested.
        unsafe { Layout::from_size_align_unchecked(self.size, self.alignment) }
    }

    /// Returns a pointer `offset` bytes into the block.
    ///
    /// # Panics
    ///
    /// Panics if `offset` exceeds the block size.
    #[inline]
    pub fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.size);
        unsafe { self.ptr.add(offset) }
    }

    /// Returns `true` if `ptr` points inside the block (end excluded).
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let start = self.ptr.as_ptr() as usize;
        let addr = ptr as usize;
        addr >= start && addr < start + self.size
    }
}
