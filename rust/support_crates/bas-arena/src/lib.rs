//! Bump (arena) allocation.
//!
//! An [`Arena`] hands out memory from a set of chunks by advancing a cursor. Every
//! request is packed as tightly as its alignment allows: the cursor is rounded up to
//! the requested alignment, the block is returned, and the cursor moves past it by
//! exactly the requested size. Nothing is freed individually; all chunks are released
//! together when the arena is dropped or [`reset`](Arena::reset).
//!
//! The arena can start from a caller-supplied buffer (see [`ArenaBuilder::buffer`]),
//! which serves the first requests without touching the backing allocator.
//!
//! ```
//! use bas_arena::Arena;
//!
//! let arena = Arena::new();
//! let hello = arena.copy_str("Hello");
//! let world = arena.copy_str("World");
//! assert_eq!(hello, "Hello");
//! // Five bytes of text and a terminator.
//! assert_eq!(world.as_ptr() as usize - hello.as_ptr() as usize, 6);
//! ```

mod arena;
mod builder;

pub use arena::Arena;
pub use builder::ArenaBuilder;

/// Size of the first chunk acquired by an arena that was not configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Upper bound for the geometric growth of chunk sizes.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Minimum alignment of every chunk obtained from the backing allocator.
///
/// Offsets between blocks of the same chunk then depend only on the requests, not on
/// where the chunk landed.
pub const CHUNK_ALIGNMENT: usize = 64;
