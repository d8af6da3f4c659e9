//! `Vector`: an owning, allocation-aware vector with inline (small-buffer) storage.

use std::{
    fmt,
    mem::{self, MaybeUninit},
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
    slice,
};

use bas_alloc::{Allocator, RawAllocator};
use bas_common::Result;

use crate::base::VectorBase;

/// A vector that keeps up to `N` elements inline and moves to a heap block obtained
/// from `A` once it outgrows them.
///
/// The storage mode is tracked by the engine's backing tag: while the buffer uses the
/// inline array the vector is *inline*; after the first growth past `N` it is *heap*
/// backed and stays so until [`clear_and_free`](Vector::clear_and_free) or a move out
/// of it resets it.
pub struct Vector<T, const N: usize = 4, A: Allocator = RawAllocator> {
    base: VectorBase<T>,
    allocator: A,
    inline_buffer: InlineBuffer<T, N>,
}

struct InlineBuffer<T, const N: usize>([MaybeUninit<T>; N]);

impl<T, const N: usize> InlineBuffer<T, N> {
    #[inline]
    const fn new() -> Self {
        InlineBuffer([const { MaybeUninit::uninit() }; N])
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        self.0.as_ptr().cast::<T>()
    }

    #[inline]
    fn as_non_null(&mut self) -> NonNull<T> {
        NonNull::from(&mut self.0).cast::<T>()
    }
}

impl<T, const N: usize, A: Allocator + Default> Vector<T, N, A> {
    /// Creates an empty inline vector. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(A::default())
    }

    /// Creates a vector of `len` default values.
    ///
    /// When `len > N` the heap block is allocated once, up front.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut v = Self::new();
        v.reserve(len);
        let (base, _) = v.parts();
        for _ in 0..len {
            base.append_unchecked(T::default());
        }
        v
    }

    /// Creates a vector of `len` clones of `value`.
    pub fn from_elem(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut v = Self::new();
        v.append_n_times(&value, len);
        v
    }

    /// Creates a vector holding clones of `values`.
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        let mut v = Self::new();
        v.extend(values);
        v
    }
}

impl<T, const N: usize, A: Allocator> Vector<T, N, A> {
    /// Creates an empty inline vector that will allocate from `allocator`.
    pub fn new_in(allocator: A) -> Self {
        Vector {
            // SAFETY: the placeholder pointer is replaced by the inline buffer address
            // in `parts()` before the engine touches it.
            base: unsafe { VectorBase::from_fixed(NonNull::dangling(), N) },
            allocator,
            inline_buffer: InlineBuffer::new(),
        }
    }

    /// Deep-copies `other`, whose inline capacity may differ.
    ///
    /// The copy is inline when `other.len() <= N`; otherwise it allocates a single
    /// block sized exactly to the number of elements.
    pub fn copy_from<const M: usize>(other: &Vector<T, M, A>) -> Self
    where
        T: Clone,
        A: Clone,
    {
        let mut v = Self::new_in(other.allocator.clone());
        let len = other.len();
        if len > N {
            v.base = VectorBase::allocate_exact(len, &v.allocator);
        }
        v.parts().0.extend_unchecked(other.as_slice());
        v
    }

    /// Moves the elements out of `other` into a new vector, leaving `other` empty and
    /// inline.
    ///
    /// A heap-backed `other` hands its block over as is (no element is touched). An
    /// inline `other` is relocated into the new vector's inline array when it fits, or
    /// into one exactly sized heap block when it does not.
    pub fn take_from<const M: usize>(other: &mut Vector<T, M, A>) -> Self
    where
        A: Clone,
    {
        let mut v = Self::new_in(other.allocator.clone());
        if other.is_inline() {
            let len = other.len();
            if len > N {
                v.base = VectorBase::allocate_exact(len, &v.allocator);
                log::trace!("relocating {len} inline elements to the heap (inline capacity {N})");
            }
            let (base, _) = v.parts();
            unsafe {
                ptr::copy_nonoverlapping(other.data_ptr(), base.as_mut_ptr(), len);
                base.set_len(len);
                other.base.set_len(0);
            }
        } else {
            // SAFETY: see `new_in`.
            let placeholder = unsafe { VectorBase::from_fixed(NonNull::dangling(), M) };
            v.base = mem::replace(&mut other.base, placeholder);
        }
        v
    }

    /// Consuming form of [`take_from`](Self::take_from).
    pub fn from_vector<const M: usize>(mut other: Vector<T, M, A>) -> Self
    where
        A: Clone,
    {
        Self::take_from(&mut other)
    }

    /// Move assignment from a vector of any inline capacity: the current contents are
    /// destroyed first, then the elements of `other` are moved in as by
    /// [`take_from`](Self::take_from).
    pub fn assign_from<const M: usize>(&mut self, other: &mut Vector<T, M, A>)
    where
        A: Clone,
    {
        self.clear_and_free();
        *self = Self::take_from(other);
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Number of elements the vector can hold without allocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.base.capacity()
    }

    /// Returns `true` while the elements live in the inline array.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.base.is_fixed()
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.data_ptr(), self.len()) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.parts().0.as_mut_slice()
    }

    #[inline]
    pub fn append(&mut self, value: T) {
        let (base, allocator) = self.parts();
        base.append(value, allocator);
    }

    pub fn append_and_get_index(&mut self, value: T) -> usize {
        let (base, allocator) = self.parts();
        base.append_and_get_index(value, allocator)
    }

    pub fn append_non_duplicates(&mut self, value: T)
    where
        T: PartialEq,
    {
        let (base, allocator) = self.parts();
        base.append_non_duplicates(value, allocator);
    }

    pub fn append_n_times(&mut self, value: &T, n: usize)
    where
        T: Clone,
    {
        let (base, allocator) = self.parts();
        base.append_n_times(value, n, allocator);
    }

    /// Appends clones of `values`.
    pub fn extend(&mut self, values: &[T])
    where
        T: Clone,
    {
        let (base, allocator) = self.parts();
        base.extend(values, allocator);
    }

    pub fn extend_non_duplicates(&mut self, values: &[T])
    where
        T: PartialEq + Clone,
    {
        let (base, allocator) = self.parts();
        base.extend_non_duplicates(values, allocator);
    }

    /// Ensures room for at least `min_capacity` elements in total.
    pub fn reserve(&mut self, min_capacity: usize) {
        let (base, allocator) = self.parts();
        base.reserve(min_capacity, allocator);
    }

    /// Fallible version of [`reserve`](Self::reserve); the vector is unchanged on error.
    pub fn try_reserve(&mut self, min_capacity: usize) -> Result<()> {
        let (base, allocator) = self.parts();
        base.try_reserve(min_capacity, allocator)
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_try(value).is_some()
    }

    /// Index of the first element equal to `value`, or `None`.
    pub fn index_try(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|e| e == value)
    }

    /// Index of the first element equal to `value`.
    ///
    /// # Panics
    ///
    /// Panics if no element equals `value`.
    pub fn index(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        match self.index_try(value) {
            Some(index) => index,
            None => panic!("value not found in vector"),
        }
    }

    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn last(&self) -> &T {
        match self.as_slice().last() {
            Some(last) => last,
            None => panic!("last() on an empty vector"),
        }
    }

    pub fn last_mut(&mut self) -> &mut T {
        self.parts().0.last_mut()
    }

    pub fn fill(&mut self, value: &T)
    where
        T: Clone,
    {
        self.parts().0.fill(value);
    }

    pub fn fill_indices(&mut self, indices: &[usize], value: &T)
    where
        T: Clone,
    {
        self.parts().0.fill_indices(indices, value);
    }

    pub fn remove_last(&mut self) {
        self.parts().0.remove_last();
    }

    pub fn pop_last(&mut self) -> T {
        self.parts().0.pop_last()
    }

    pub fn remove_and_reorder(&mut self, index: usize) {
        self.parts().0.remove_and_reorder(index);
    }

    pub fn take_and_reorder(&mut self, index: usize) -> T {
        self.parts().0.take_and_reorder(index)
    }

    pub fn remove_first_occurrence_and_reorder(&mut self, value: &T)
    where
        T: PartialEq,
    {
        self.parts().0.remove_first_occurrence_and_reorder(value);
    }

    /// Drops all elements, keeping the current storage.
    pub fn clear(&mut self) {
        self.parts().0.clear();
    }

    /// Drops all elements, releases the heap block (if any) and returns to inline mode.
    pub fn clear_and_free(&mut self) {
        let (base, allocator) = self.parts();
        base.clear_and_free(allocator);
        // A released heap buffer comes back with zero capacity; the inline array is
        // empty and usable again.
        // SAFETY: see `new_in`.
        self.base = unsafe { VectorBase::from_fixed(NonNull::dangling(), N) };
    }

    /// Engine and allocator, with the engine pointed at the inline array when it is in
    /// use.
    #[inline]
    fn parts(&mut self) -> (&mut VectorBase<T>, &A) {
        if self.base.is_fixed() {
            let inline = self.inline_buffer.as_non_null();
            unsafe { self.base.rebase(inline) };
        }
        (&mut self.base, &self.allocator)
    }

    #[inline]
    pub(crate) fn data_ptr(&self) -> *const T {
        if self.base.is_fixed() {
            self.inline_buffer.as_ptr()
        } else {
            self.base.as_ptr()
        }
    }

    /// Forgets the elements without dropping them; used by the consuming iterator,
    /// which takes over their ownership.
    ///
    /// # Safety
    ///
    /// The caller becomes responsible for the first `len()` elements.
    pub(crate) unsafe fn forget_elements(&mut self) {
        unsafe { self.base.set_len(0) };
    }
}

impl<T, const N: usize, A: Allocator> Drop for Vector<T, N, A> {
    fn drop(&mut self) {
        let (base, allocator) = self.parts();
        base.clear_and_free(allocator);
    }
}

impl<T, const N: usize, A: Allocator + Default> Default for Vector<T, N, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize, A: Allocator + Clone> Clone for Vector<T, N, A> {
    fn clone(&self) -> Self {
        Self::copy_from(self)
    }
}

impl<T, const N: usize, A: Allocator> Deref for Vector<T, N, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, A: Allocator> DerefMut for Vector<T, N, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize, A: Allocator> AsRef<[T]> for Vector<T, N, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, A: Allocator> AsMut<[T]> for Vector<T, N, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for Vector<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("values", &self.as_slice())
            .field("len", &self.len())
            .field("cap", &self.capacity())
            .field("inline", &self.is_inline())
            .finish_non_exhaustive()
    }
}

impl<T, U, const N: usize, const M: usize, A, B> PartialEq<Vector<U, M, B>> for Vector<T, N, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &Vector<U, M, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize, A: Allocator> Eq for Vector<T, N, A> {}

impl<T, const N: usize, A: Allocator + Default> FromIterator<T> for Vector<T, N, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new();
        v.extend_from_iter(iter);
        v
    }
}

impl<T, const N: usize, A: Allocator> Vector<T, N, A> {
    fn extend_from_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let (base, allocator) = self.parts();
        base.extend_from_iter(iter, allocator);
    }
}

impl<T, const N: usize, A: Allocator> Extend<T> for Vector<T, N, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_from_iter(iter);
    }
}

impl<T, const N: usize, const K: usize, A: Allocator + Default> From<[T; K]> for Vector<T, N, A> {
    fn from(values: [T; K]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone, const N: usize, A: Allocator + Default> From<&[T]> for Vector<T, N, A> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a Vector<T, N, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a mut Vector<T, N, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

// The vector exclusively owns its elements, its storage and its allocator instance.
unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for Vector<T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for Vector<T, N, A> {}
