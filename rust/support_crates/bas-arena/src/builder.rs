use std::mem::MaybeUninit;

use bas_alloc::{Allocator, RawAllocator};

use crate::{Arena, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNK_SIZE};

/// Configures and creates an [`Arena`].
///
/// ```
/// use std::mem::MaybeUninit;
/// use bas_arena::Arena;
///
/// let mut seed = [MaybeUninit::<u8>::uninit(); 256];
/// let arena = Arena::builder()
///     .chunk_size(1024)
///     .max_chunk_size(64 * 1024)
///     .buffer(&mut seed)
///     .build();
/// arena.allocate(100, 8);
/// assert_eq!(arena.chunk_count(), 0);
/// ```
pub struct ArenaBuilder<'buf, A = RawAllocator> {
    allocator: A,
    chunk_size: usize,
    max_chunk_size: usize,
    buffer: Option<&'buf mut [MaybeUninit<u8>]>,
}

impl ArenaBuilder<'static, RawAllocator> {
    pub fn new() -> Self {
        ArenaBuilder {
            allocator: RawAllocator,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            buffer: None,
        }
    }
}

impl Default for ArenaBuilder<'static, RawAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'buf, A: Allocator> ArenaBuilder<'buf, A> {
    /// Size of the first chunk acquired from the backing allocator. Later chunks
    /// double in size up to [`max_chunk_size`](Self::max_chunk_size).
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is zero.
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        assert!(bytes > 0, "chunk size must be non-zero");
        self.chunk_size = bytes;
        self
    }

    /// Largest chunk the arena grows to. A single request larger than this gets a
    /// dedicated chunk of exactly its size.
    pub fn max_chunk_size(mut self, bytes: usize) -> Self {
        self.max_chunk_size = bytes;
        self
    }

    /// Uses `buffer` as the first chunk. The arena borrows it for its whole lifetime
    /// and never passes it to the backing allocator.
    pub fn buffer<'b>(self, buffer: &'b mut [MaybeUninit<u8>]) -> ArenaBuilder<'b, A> {
        ArenaBuilder {
            allocator: self.allocator,
            chunk_size: self.chunk_size,
            max_chunk_size: self.max_chunk_size,
            buffer: Some(buffer),
        }
    }

    /// Allocator the chunks are obtained from.
    pub fn allocator<B: Allocator>(self, allocator: B) -> ArenaBuilder<'buf, B> {
        ArenaBuilder {
            allocator,
            chunk_size: self.chunk_size,
            max_chunk_size: self.max_chunk_size,
            buffer: self.buffer,
        }
    }

    pub fn build(self) -> Arena<'buf, A> {
        let max_chunk_size = self.max_chunk_size.max(self.chunk_size);
        Arena::from_parts(self.allocator, self.chunk_size, max_chunk_size, self.buffer)
    }
}
