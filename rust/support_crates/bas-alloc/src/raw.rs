use std::{alloc::Layout, ptr::NonNull};

use bas_common::{Result, error::Error, verify_arg};

use crate::{Allocator, MemoryBlock};

/// Stateless aligned heap allocator backed by the global allocator.
///
/// `RawAllocator` carries no data: every instance is interchangeable, so it is
/// trivially copyable and may be freely embedded in containers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawAllocator;

impl RawAllocator {
    pub const fn new() -> RawAllocator {
        RawAllocator
    }
}

unsafe impl Allocator for RawAllocator {
    fn try_allocate(&self, size: usize, alignment: usize) -> Result<MemoryBlock> {
        verify_arg!(alignment, alignment != 0 && alignment.is_power_of_two());
        if size == 0 {
            return Ok(MemoryBlock::dangling(alignment));
        }
        let layout =
            Layout::from_size_align(size, alignment).map_err(|_| Error::capacity_overflow())?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(|| Error::allocation_failed(size, alignment))?;
        // SAFETY: the global allocator honors the layout's alignment.
        Ok(unsafe { MemoryBlock::from_raw_parts(ptr, size, alignment) })
    }

    unsafe fn free(&self, block: MemoryBlock) {
        if block.is_empty() {
            return;
        }
        unsafe { std::alloc::dealloc(block.as_ptr(), block.layout()) }
    }
}
