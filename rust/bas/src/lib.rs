//! # bas: allocation-aware foundation containers
//!
//! This crate is the single entry point to the bas-* crates. It re-exports them as
//! modules so applications can depend on one crate.
//!
//! ## Module Organization
//!
//! * [`common`] - Error type and result helpers shared by all crates
//! * [`align`] - Alignment and power-of-two arithmetic
//! * [`alloc`] - The [`Allocator`](alloc::Allocator) capability, the default
//!   [`RawAllocator`](alloc::RawAllocator) and the instrumented
//!   [`TrackingAllocator`](alloc::TrackingAllocator)
//! * [`vector`] - The growable buffer engine ([`VectorBase`](vector::VectorBase)) and
//!   the small-buffer [`Vector`](vector::Vector)
//! * [`arena`] - The bump allocator ([`Arena`](arena::Arena))
//!
//! Every container is parameterized over an allocator instance that it owns. An arena
//! is itself an allocator, so a vector can draw its storage from one:
//!
//! ```
//! use bas::{arena::Arena, vector::Vector};
//!
//! let arena = Arena::new();
//! let mut names: Vector<&str, 2, &Arena> = Vector::new_in(&arena);
//! for name in ["alpha", "beta", "gamma"] {
//!     names.append(arena.copy_str(name));
//! }
//! assert_eq!(names.as_slice(), &["alpha", "beta", "gamma"]);
//! assert!(!names.is_inline());
//! ```

pub use bas_align as align;
pub use bas_alloc as alloc;
pub use bas_arena as arena;
pub use bas_common as common;
pub use bas_vector as vector;
