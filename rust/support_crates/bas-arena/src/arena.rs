use std::{
    alloc::Layout,
    cell::{Cell, RefCell},
    ffi::CStr,
    fmt,
    marker::PhantomData,
    mem::MaybeUninit,
    ptr::{self, NonNull},
    slice, str,
};

use bas_alloc::{Allocator, MemoryBlock, RawAllocator};
use bas_common::{Result, verify_arg};

use crate::{ArenaBuilder, CHUNK_ALIGNMENT};

/// Bump allocator over a growing list of chunks.
///
/// Allocation takes `&self`, so references handed out by the arena can coexist; they
/// all stay valid until the arena is dropped or reset. Values placed in the arena are
/// never dropped.
///
/// The arena is single-threaded (`!Send`, `!Sync`).
pub struct Arena<'buf, A: Allocator = RawAllocator> {
    cursor: Cell<*mut u8>,
    end: Cell<*mut u8>,
    chunks: RefCell<Vec<MemoryBlock>>,
    next_chunk_size: Cell<usize>,
    allocated_bytes: Cell<usize>,
    chunk_size: usize,
    max_chunk_size: usize,
    seed: Option<(NonNull<u8>, usize)>,
    allocator: A,
    _buffer: PhantomData<&'buf mut [MaybeUninit<u8>]>,
}

impl Arena<'static, RawAllocator> {
    /// Creates an empty arena with the default configuration. Does not allocate.
    pub fn new() -> Self {
        ArenaBuilder::new().build()
    }

    pub fn builder() -> ArenaBuilder<'static, RawAllocator> {
        ArenaBuilder::new()
    }
}

impl Default for Arena<'static, RawAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Arena<'static, A> {
    /// Creates an empty arena that obtains its chunks from `allocator`.
    pub fn new_in(allocator: A) -> Self {
        ArenaBuilder::new().allocator(allocator).build()
    }
}

impl<'buf, A: Allocator> Arena<'buf, A> {
    pub(crate) fn from_parts(
        allocator: A,
        chunk_size: usize,
        max_chunk_size: usize,
        buffer: Option<&'buf mut [MaybeUninit<u8>]>,
    ) -> Self {
        let seed = buffer.and_then(|buffer| {
            let len = buffer.len();
            NonNull::new(buffer.as_mut_ptr().cast::<u8>()).map(|begin| (begin, len))
        });
        let arena = Arena {
            cursor: Cell::new(ptr::null_mut()),
            end: Cell::new(ptr::null_mut()),
            chunks: RefCell::new(Vec::new()),
            next_chunk_size: Cell::new(chunk_size),
            allocated_bytes: Cell::new(0),
            chunk_size,
            max_chunk_size,
            seed,
            allocator,
            _buffer: PhantomData,
        };
        arena.rewind();
        arena
    }

    /// Allocates `size` bytes aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two. Aborts through
    /// [`std::alloc::handle_alloc_error`] if a new chunk cannot be obtained.
    #[inline]
    pub fn allocate(&self, size: usize, alignment: usize) -> NonNull<u8> {
        <Self as Allocator>::allocate(self, size, alignment).ptr()
    }

    /// Fallible version of [`allocate`](Self::allocate). The arena is unchanged on
    /// error.
    #[inline]
    pub fn try_allocate(&self, size: usize, alignment: usize) -> Result<NonNull<u8>> {
        verify_arg!(alignment, alignment != 0 && alignment.is_power_of_two());
        if size == 0 {
            return Ok(MemoryBlock::dangling(alignment).ptr());
        }
        let ptr = match self.bump(size, alignment) {
            Some(ptr) => ptr,
            None => self.allocate_from_new_chunk(size, alignment)?,
        };
        self.allocated_bytes.set(self.allocated_bytes.get() + size);
        Ok(ptr)
    }

    #[inline]
    pub fn allocate_layout(&self, layout: Layout) -> NonNull<u8> {
        self.allocate(layout.size(), layout.align())
    }

    /// Moves `value` into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> &mut T {
        let ptr = self.allocate_layout(Layout::new::<T>()).cast::<T>();
        unsafe {
            ptr.write(value);
            &mut *ptr.as_ptr()
        }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, values: &[T]) -> &mut [T] {
        let ptr = self.allocate_layout(Layout::for_value(values)).cast::<T>();
        unsafe {
            ptr::copy_nonoverlapping(values.as_ptr(), ptr.as_ptr(), values.len());
            slice::from_raw_parts_mut(ptr.as_ptr(), values.len())
        }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_clone<T: Clone>(&self, values: &[T]) -> &mut [T] {
        let ptr = self.allocate_layout(Layout::for_value(values)).cast::<T>();
        for (i, value) in values.iter().enumerate() {
            unsafe { ptr.as_ptr().add(i).write(value.clone()) };
        }
        unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), values.len()) }
    }

    /// Copies `bytes` into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn copy_bytes(&self, bytes: &[u8]) -> &mut [u8] {
        self.alloc_slice_copy(bytes)
    }

    /// Copies `text` into the arena followed by a NUL terminator, and returns the
    /// copied text (without the terminator).
    pub fn copy_str(&self, text: &str) -> &str {
        let bytes = self.copy_with_nul(text.as_bytes());
        unsafe { str::from_utf8_unchecked(&bytes[..text.len()]) }
    }

    /// Copies `text` into the arena as a NUL-terminated C string.
    ///
    /// Returns `InvalidArgument` if `text` contains a NUL byte.
    pub fn copy_c_str(&self, text: &str) -> Result<&CStr> {
        verify_arg!(text, !text.as_bytes().contains(&0));
        let bytes = self.copy_with_nul(text.as_bytes());
        Ok(unsafe { CStr::from_bytes_with_nul_unchecked(bytes) })
    }

    /// Number of chunks obtained from the backing allocator (the seed buffer is not
    /// counted).
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Total size of the blocks handed out since creation or the last reset, alignment
    /// padding excluded.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes.get()
    }

    /// Total size of the seed buffer and all chunks.
    pub fn reserved_bytes(&self) -> usize {
        let seed = self.seed.map_or(0, |(_, len)| len);
        seed + self.chunks.borrow().iter().map(MemoryBlock::size).sum::<usize>()
    }

    /// Bytes left in the chunk currently being filled.
    pub fn remaining_in_chunk(&self) -> usize {
        self.end.get() as usize - self.cursor.get() as usize
    }

    /// Releases every chunk and starts over from the seed buffer (if any).
    pub fn reset(&mut self) {
        log::debug!(
            "resetting arena: {} chunks, {} bytes allocated",
            self.chunk_count(),
            self.allocated_bytes()
        );
        self.free_chunks();
        self.next_chunk_size.set(self.chunk_size);
        self.allocated_bytes.set(0);
        self.rewind();
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    #[inline]
    fn bump(&self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        let cursor = self.cursor.get();
        let addr = cursor as usize;
        let padding = bas_align::checked_align_up(addr, alignment)? - addr;
        let available = self.end.get() as usize - addr;
        if padding.checked_add(size)? > available {
            return None;
        }
        // SAFETY: `padding + size` bytes past the cursor are inside the current chunk.
        unsafe {
            let ptr = cursor.add(padding);
            self.cursor.set(ptr.add(size));
            Some(NonNull::new_unchecked(ptr))
        }
    }

    #[cold]
    #[inline(never)]
    fn allocate_from_new_chunk(&self, size: usize, alignment: usize) -> Result<NonNull<u8>> {
        let chunk_alignment = alignment.max(CHUNK_ALIGNMENT);
        if size > self.max_chunk_size {
            // Dedicated chunk; the current one keeps serving smaller requests.
            return Ok(self.acquire_chunk(size, chunk_alignment)?.ptr());
        }

        let chunk = self.acquire_chunk(size.max(self.next_chunk_size.get()), chunk_alignment)?;
        let next = self.next_chunk_size.get().saturating_mul(2);
        self.next_chunk_size.set(next.min(self.max_chunk_size));

        let begin = chunk.as_ptr();
        unsafe {
            self.cursor.set(begin.add(size));
            self.end.set(begin.add(chunk.size()));
        }
        Ok(chunk.ptr())
    }

    fn acquire_chunk(&self, size: usize, alignment: usize) -> Result<MemoryBlock> {
        let chunk = self.allocator.try_allocate(size, alignment)?;
        let mut chunks = self.chunks.borrow_mut();
        chunks.push(chunk);
        log::debug!(
            "arena acquired chunk #{}: {size} bytes, alignment {alignment}",
            chunks.len()
        );
        Ok(chunk)
    }

    fn copy_with_nul(&self, bytes: &[u8]) -> &[u8] {
        let len = bytes.len();
        let ptr = self.allocate(len + 1, 1).as_ptr();
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, len);
            ptr.add(len).write(0);
            slice::from_raw_parts(ptr, len + 1)
        }
    }

    fn rewind(&self) {
        match self.seed {
            Some((begin, len)) => {
                self.cursor.set(begin.as_ptr());
                self.end.set(unsafe { begin.as_ptr().add(len) });
            }
            None => {
                self.cursor.set(ptr::null_mut());
                self.end.set(ptr::null_mut());
            }
        }
    }

    fn free_chunks(&mut self) {
        for chunk in self.chunks.get_mut().drain(..) {
            unsafe { self.allocator.free(chunk) };
        }
    }
}

unsafe impl<A: Allocator> Allocator for Arena<'_, A> {
    fn try_allocate(&self, size: usize, alignment: usize) -> Result<MemoryBlock> {
        let ptr = Self::try_allocate(self, size, alignment)?;
        Ok(unsafe { MemoryBlock::from_raw_parts(ptr, size, alignment) })
    }

    /// Blocks are reclaimed only when the arena is dropped or reset.
    unsafe fn free(&self, _block: MemoryBlock) {}
}

impl<A: Allocator> Drop for Arena<'_, A> {
    fn drop(&mut self) {
        self.free_chunks();
    }
}

impl<A: Allocator> fmt::Debug for Arena<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("chunks", &self.chunk_count())
            .field("allocated_bytes", &self.allocated_bytes())
            .field("reserved_bytes", &self.reserved_bytes())
            .field("remaining_in_chunk", &self.remaining_in_chunk())
            .finish_non_exhaustive()
    }
}
