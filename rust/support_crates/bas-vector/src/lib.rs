//! Growable buffers parameterized over an allocator.
//!
//! [`VectorBase`] is the engine: a contiguous run of elements over storage that is
//! either owned by the caller or obtained from an allocator passed into each call.
//! Higher-level containers hold one or more engines and forward their allocator.
//!
//! [`Vector`] is the owning container built on it: an inline array of `N` elements,
//! an allocator instance, and value semantics across different inline capacities.
//!
//! ```
//! use bas_vector::Vector;
//!
//! let mut v: Vector<i32, 2> = Vector::new();
//! v.append(1);
//! v.append(2);
//! assert!(v.is_inline());
//! v.append(3);
//! assert!(!v.is_inline());
//! assert_eq!(v.as_slice(), &[1, 2, 3]);
//! ```

pub mod base;
pub mod into_iter;
pub mod vector;

pub use base::{Backing, VectorBase};
pub use into_iter::IntoIter;
pub use vector::Vector;
