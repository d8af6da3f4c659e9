//! `VectorBase`: the growable buffer engine shared by every container.
//!
//! A `VectorBase<T>` tracks one contiguous region of `T` slots: `[0, len)` holds live
//! elements, `[len, capacity)` is uninitialized. It does not store an allocator; every
//! operation that may need memory takes the allocator as a parameter, so the same
//! engine serves heap-backed buffers and fixed regions supplied by the owner (such as
//! the inline array of a [`Vector`](crate::Vector)).
//!
//! The engine has no `Drop` implementation. Its owner must release it with
//! [`VectorBase::clear_and_free`], passing the allocator the buffer grew with.

use std::{
    fmt,
    marker::PhantomData,
    mem,
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
    slice,
};

use bas_alloc::{Allocator, MemoryBlock};
use bas_common::{Result, error::Error};

/// Where the storage of a [`VectorBase`] comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// A region owned by the caller (for example an inline array). The engine never
    /// frees it.
    Fixed,
    /// A block obtained from an allocator. Freed on growth and by `clear_and_free`.
    Allocated(MemoryBlock),
}

/// Growable buffer of `T` over caller-provided or allocator-provided storage.
pub struct VectorBase<T> {
    begin: NonNull<T>,
    len: usize,
    capacity: usize,
    backing: Backing,
    _marker: PhantomData<T>,
}

impl<T> VectorBase<T> {
    /// Creates an empty buffer with zero capacity. Does not allocate.
    pub const fn new() -> VectorBase<T> {
        VectorBase {
            begin: NonNull::dangling(),
            len: 0,
            capacity: 0,
            backing: Backing::Fixed,
            _marker: PhantomData,
        }
    }

    /// Creates an empty buffer over a caller-supplied region of `capacity` slots.
    ///
    /// The region is used until the buffer outgrows it; it is never freed by the
    /// engine.
    ///
    /// # Safety
    ///
    /// `begin` must be aligned for `T` and valid for reads and writes of `capacity`
    /// elements for as long as the buffer uses it.
    pub const unsafe fn from_fixed(begin: NonNull<T>, capacity: usize) -> VectorBase<T> {
        VectorBase {
            begin,
            len: 0,
            capacity,
            backing: Backing::Fixed,
            _marker: PhantomData,
        }
    }

    /// Creates an empty buffer backed by a freshly allocated block of exactly
    /// `capacity` slots (no power-of-two rounding).
    pub fn allocate_exact<A: Allocator>(capacity: usize, allocator: &A) -> VectorBase<T> {
        let size = Self::byte_size(capacity).expect("capacity overflow");
        let block = allocator.allocate(size, mem::align_of::<T>());
        VectorBase {
            begin: block.ptr().cast::<T>(),
            len: 0,
            capacity,
            backing: Backing::Allocated(block),
            _marker: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots available without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn backing(&self) -> Backing {
        self.backing
    }

    /// Returns `true` if the storage is a caller-supplied region.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self.backing, Backing::Fixed)
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        matches!(self.backing, Backing::Allocated(_))
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.begin.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.begin.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.begin.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.begin.as_ptr(), self.len) }
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Sets the number of live elements.
    ///
    /// # Safety
    ///
    /// `new_len` must not exceed the capacity, and the first `new_len` slots must hold
    /// initialized elements. Shrinking this way forgets (does not drop) the tail.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity);
        self.len = new_len;
    }

    /// Points a fixed-backed buffer at the current address of its region.
    ///
    /// Owners whose fixed region moves together with them (inline arrays) call this
    /// before handing the buffer out.
    ///
    /// # Safety
    ///
    /// `begin` must address the same logical region (same contents, same capacity) the
    /// buffer was using.
    #[inline]
    pub(crate) unsafe fn rebase(&mut self, begin: NonNull<T>) {
        debug_assert!(self.is_fixed());
        self.begin = begin;
    }

    /// Appends `value`, growing to at least `len + 1` slots first when full.
    #[inline]
    pub fn append<A: Allocator>(&mut self, value: T, allocator: &A) {
        if self.len == self.capacity {
            self.grow(self.len + 1, allocator);
        }
        self.append_unchecked(value);
    }

    /// Appends `value` without a growth check.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is full.
    #[inline]
    pub fn append_unchecked(&mut self, value: T) {
        assert!(self.len < self.capacity, "append_unchecked on a full buffer");
        unsafe { self.begin.as_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Appends `value` and returns the index it was stored at.
    pub fn append_and_get_index<A: Allocator>(&mut self, value: T, allocator: &A) -> usize {
        let index = self.len;
        self.append(value, allocator);
        index
    }

    /// Appends `value` unless an equal element is already present.
    pub fn append_non_duplicates<A: Allocator>(&mut self, value: T, allocator: &A)
    where
        T: PartialEq,
    {
        if !self.contains(&value) {
            self.append(value, allocator);
        }
    }

    /// Appends `n` clones of `value`, reserving room for all of them up front.
    pub fn append_n_times<A: Allocator>(&mut self, value: &T, n: usize, allocator: &A)
    where
        T: Clone,
    {
        self.reserve(self.required_len(n), allocator);
        for _ in 0..n {
            self.append_unchecked(value.clone());
        }
    }

    /// Appends clones of all `values`, reserving room for them up front.
    pub fn extend<A: Allocator>(&mut self, values: &[T], allocator: &A)
    where
        T: Clone,
    {
        self.reserve(self.required_len(values.len()), allocator);
        self.extend_unchecked(values);
    }

    /// Appends clones of all `values` without growing.
    ///
    /// # Panics
    ///
    /// Panics if the remaining capacity is smaller than `values.len()`.
    pub fn extend_unchecked(&mut self, values: &[T])
    where
        T: Clone,
    {
        assert!(
            values.len() <= self.capacity - self.len,
            "extend_unchecked beyond capacity"
        );
        for value in values {
            // Length is bumped per element so a panicking `clone` leaves a consistent
            // buffer behind.
            unsafe { self.begin.as_ptr().add(self.len).write(value.clone()) };
            self.len += 1;
        }
    }

    /// Appends every element produced by `iter`.
    pub fn extend_from_iter<A: Allocator, I>(&mut self, iter: I, allocator: &A)
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.required_len(lower), allocator);
        for value in iter {
            self.append(value, allocator);
        }
    }

    /// Appends clones of the elements of `values` that are not already present.
    pub fn extend_non_duplicates<A: Allocator>(&mut self, values: &[T], allocator: &A)
    where
        T: PartialEq + Clone,
    {
        for value in values {
            if !self.contains(value) {
                self.append(value.clone(), allocator);
            }
        }
    }

    /// Ensures the capacity is at least `min_capacity`. No-op when it already is.
    #[inline]
    pub fn reserve<A: Allocator>(&mut self, min_capacity: usize, allocator: &A) {
        if min_capacity > self.capacity {
            self.grow(min_capacity, allocator);
        }
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// On error the buffer is left untouched.
    pub fn try_reserve<A: Allocator>(&mut self, min_capacity: usize, allocator: &A) -> Result<()> {
        if min_capacity <= self.capacity {
            return Ok(());
        }
        let new_capacity = bas_align::checked_ceil_power_of_two(min_capacity)
            .ok_or_else(Error::capacity_overflow)?;
        let size = Self::byte_size(new_capacity).ok_or_else(Error::capacity_overflow)?;
        let block = allocator.try_allocate(size, mem::align_of::<T>())?;
        unsafe { self.relocate_into(block, new_capacity, allocator) };
        Ok(())
    }

    /// Returns a reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is empty.
    #[inline]
    pub fn last(&self) -> &T {
        assert!(!self.is_empty(), "last() on an empty buffer");
        unsafe { &*self.begin.as_ptr().add(self.len - 1) }
    }

    #[inline]
    pub fn last_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "last_mut() on an empty buffer");
        unsafe { &mut *self.begin.as_ptr().add(self.len - 1) }
    }

    /// Overwrites every live element with a clone of `value`.
    pub fn fill(&mut self, value: &T)
    where
        T: Clone,
    {
        for slot in self.as_mut_slice() {
            slot.clone_from(value);
        }
    }

    /// Overwrites the elements at `indices` with clones of `value`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn fill_indices(&mut self, indices: &[usize], value: &T)
    where
        T: Clone,
    {
        let slice = self.as_mut_slice();
        for &index in indices {
            slice[index].clone_from(value);
        }
    }

    /// Drops all live elements. Capacity and storage are kept.
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.begin.as_ptr(), len));
        }
    }

    /// Drops all live elements and releases allocated storage.
    ///
    /// An allocated buffer returns to the empty, zero-capacity state. A fixed region is
    /// only cleared: it belongs to the caller and is never passed to `allocator`.
    pub fn clear_and_free<A: Allocator>(&mut self, allocator: &A) {
        self.clear();
        if let Backing::Allocated(block) = self.backing {
            *self = VectorBase::new();
            unsafe { allocator.free(block) };
        }
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is empty.
    pub fn remove_last(&mut self) {
        assert!(!self.is_empty(), "remove_last() on an empty buffer");
        self.len -= 1;
        unsafe { ptr::drop_in_place(self.begin.as_ptr().add(self.len)) };
    }

    /// Moves the last element out of the buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is empty.
    pub fn pop_last(&mut self) -> T {
        assert!(!self.is_empty(), "pop_last() on an empty buffer");
        self.len -= 1;
        unsafe { self.begin.as_ptr().add(self.len).read() }
    }

    /// Removes the element at `index` by moving the last element into its slot.
    ///
    /// O(1); does not preserve order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_and_reorder(&mut self, index: usize) {
        drop(self.take_and_reorder(index));
    }

    /// Same as [`remove_and_reorder`](Self::remove_and_reorder), returning the removed
    /// element instead of dropping it.
    pub fn take_and_reorder(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "index {index} out of bounds (len {})",
            self.len
        );
        self.len -= 1;
        unsafe {
            let last = self.begin.as_ptr().add(self.len).read();
            if index < self.len {
                ptr::replace(self.begin.as_ptr().add(index), last)
            } else {
                last
            }
        }
    }

    /// Removes the first element equal to `value` using
    /// [`remove_and_reorder`](Self::remove_and_reorder).
    ///
    /// # Panics
    ///
    /// Panics if no element equals `value`.
    pub fn remove_first_occurrence_and_reorder(&mut self, value: &T)
    where
        T: PartialEq,
    {
        let index = self.index(value);
        self.remove_and_reorder(index);
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
            None => panic!("value not found in buffer"),
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_try(value).is_some()
    }

    /// Grows the buffer to the smallest power of two that holds `min_capacity`
    /// elements, relocating the live elements.
    #[cold]
    #[inline(never)]
    fn grow<A: Allocator>(&mut self, min_capacity: usize, allocator: &A) {
        if min_capacity <= self.capacity {
            return;
        }
        let new_capacity = bas_align::ceil_power_of_two(min_capacity);
        let size = Self::byte_size(new_capacity).expect("capacity overflow");
        let block = allocator.allocate(size, mem::align_of::<T>());
        unsafe { self.relocate_into(block, new_capacity, allocator) };
    }

    /// Moves the live elements into `block` and adopts it as the new storage. The old
    /// storage is freed only when it was allocated.
    ///
    /// # Safety
    ///
    /// `block` must come from `allocator`, be aligned for `T` and hold `new_capacity`
    /// elements, with `new_capacity >= len`.
    unsafe fn relocate_into<A: Allocator>(
        &mut self,
        block: MemoryBlock,
        new_capacity: usize,
        allocator: &A,
    ) {
        debug_assert!(new_capacity >= self.len);
        log::trace!(
            "growing buffer: capacity {} -> {}, element size {}, from fixed region: {}",
            self.capacity,
            new_capacity,
            mem::size_of::<T>(),
            self.is_fixed()
        );
        let new_begin = block.ptr().cast::<T>();
        unsafe {
            ptr::copy_nonoverlapping(self.begin.as_ptr(), new_begin.as_ptr(), self.len);
        }
        let old_backing = mem::replace(&mut self.backing, Backing::Allocated(block));
        self.begin = new_begin;
        self.capacity = new_capacity;
        if let Backing::Allocated(old) = old_backing {
            unsafe { allocator.free(old) };
        }
    }

    #[inline]
    fn required_len(&self, additional: usize) -> usize {
        self.len.checked_add(additional).expect("capacity overflow")
    }

    #[inline]
    fn byte_size(capacity: usize) -> Option<usize> {
        mem::size_of::<T>().checked_mul(capacity)
    }
}

impl<T> Default for VectorBase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for VectorBase<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for VectorBase<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: fmt::Debug> fmt::Debug for VectorBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorBase")
            .field("values", &self.as_slice())
            .field("len", &self.len)
            .field("cap", &self.capacity)
            .field("backing", &self.backing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, mem::MaybeUninit, rc::Rc};

    use bas_alloc::{RawAllocator, TrackingAllocator};

    use super::*;

    fn filled(values: &[i32], allocator: &TrackingAllocator) -> VectorBase<i32> {
        let mut base = VectorBase::new();
        base.extend(values, allocator);
        base
    }

    #[test]
    fn test_empty_buffer_does_not_allocate() {
        let allocator = TrackingAllocator::new();
        let mut base = VectorBase::<u64>::new();
        assert_eq!(base.len(), 0);
        assert_eq!(base.capacity(), 0);
        base.reserve(0, &allocator);
        assert_eq!(base.capacity(), 0);
        base.clear_and_free(&allocator);
        assert_eq!(allocator.stats().allocations(), 0);
    }

    #[test]
    fn test_append_growth_is_power_of_two() {
        let allocator = TrackingAllocator::new();
        let mut base = VectorBase::new();
        for k in 0..1000u32 {
            base.append(k, &allocator);
            assert_eq!(base.len(), k as usize + 1);
            assert!(base.capacity() >= base.len());
            assert!(base.capacity().is_power_of_two());
        }
        assert!(base.iter().copied().eq(0..1000));
        // 1, 2, 4, ..., 1024
        assert_eq!(allocator.stats().allocations(), 11);
        assert_eq!(allocator.stats().live_blocks(), 1);
        base.clear_and_free(&allocator);
        assert_eq!(allocator.stats().live_blocks(), 0);
    }

    #[test]
    fn test_reserve() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[1, 2, 3], &allocator);
        base.reserve(5, &allocator);
        assert_eq!(base.capacity(), 8);
        let allocations = allocator.stats().allocations();
        base.reserve(8, &allocator);
        base.reserve(2, &allocator);
        assert_eq!(base.capacity(), 8);
        assert_eq!(allocator.stats().allocations(), allocations);
        assert_eq!(base.as_slice(), &[1, 2, 3]);
        base.clear_and_free(&allocator);
    }

    #[test]
    fn test_try_reserve() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[1, 2], &allocator);
        base.try_reserve(100, &allocator).unwrap();
        assert_eq!(base.capacity(), 128);
        assert_eq!(base.as_slice(), &[1, 2]);

        let err = base.try_reserve(usize::MAX, &allocator).unwrap_err();
        assert!(matches!(
            err.kind(),
            bas_common::error::ErrorKind::CapacityOverflow
        ));
        assert_eq!(base.capacity(), 128);
        assert_eq!(base.as_slice(), &[1, 2]);
        base.clear_and_free(&allocator);
    }

    #[test]
    fn test_fixed_region_is_never_freed() {
        let allocator = TrackingAllocator::new();
        let mut region = [MaybeUninit::<i32>::uninit(); 4];
        let begin = NonNull::new(region.as_mut_ptr().cast::<i32>()).unwrap();
        let mut base = unsafe { VectorBase::from_fixed(begin, 4) };
        for i in 0..4 {
            base.append(i, &allocator);
        }
        assert!(base.is_fixed());
        assert_eq!(base.as_ptr(), begin.as_ptr() as *const i32);
        assert_eq!(allocator.stats().allocations(), 0);

        base.append(4, &allocator);
        assert!(base.is_allocated());
        assert_eq!(base.capacity(), 8);
        assert_eq!(base.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(allocator.stats().allocations(), 1);
        assert_eq!(allocator.stats().frees(), 0);

        base.clear_and_free(&allocator);
        assert_eq!(allocator.stats().frees(), 1);
        assert_eq!(base.capacity(), 0);
    }

    #[test]
    fn test_clear_and_free_on_fixed_region_only_clears() {
        let allocator = TrackingAllocator::new();
        let mut region = [MaybeUninit::<String>::uninit(), MaybeUninit::uninit()];
        let begin = NonNull::new(region.as_mut_ptr().cast::<String>()).unwrap();
        let mut base = unsafe { VectorBase::from_fixed(begin, 2) };
        base.append("a".to_string(), &allocator);
        base.clear_and_free(&allocator);
        assert!(base.is_empty());
        assert_eq!(base.capacity(), 2);
        assert_eq!(allocator.stats().frees(), 0);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[5, 6, 7, 8, 9], &allocator);
        let cap = base.capacity();
        let allocations = allocator.stats().allocations();
        base.clear();
        assert!(base.is_empty());
        assert_eq!(base.capacity(), cap);
        base.extend(&[5, 6, 7, 8, 9], &allocator);
        assert_eq!(base.as_slice(), &[5, 6, 7, 8, 9]);
        assert_eq!(base.capacity(), cap);
        assert_eq!(allocator.stats().allocations(), allocations);
        base.clear_and_free(&allocator);
    }

    #[test]
    fn test_remove_and_reorder() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[4, 5, 6, 7], &allocator);
        base.remove_and_reorder(1);
        assert_eq!(base.as_slice(), &[4, 7, 6]);
        base.remove_and_reorder(2);
        assert_eq!(base.as_slice(), &[4, 7]);
        base.remove_and_reorder(0);
        assert_eq!(base.as_slice(), &[7]);
        base.remove_and_reorder(0);
        assert!(base.is_empty());
        base.clear_and_free(&allocator);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_remove_and_reorder_out_of_bounds() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[1, 2], &allocator);
        base.remove_and_reorder(2);
    }

    #[test]
    fn test_remove_first_occurrence_and_reorder() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[4, 5, 6, 7], &allocator);
        base.remove_first_occurrence_and_reorder(&5);
        assert_eq!(base.as_slice(), &[4, 7, 6]);
        base.remove_first_occurrence_and_reorder(&6);
        assert_eq!(base.as_slice(), &[4, 7]);
        base.remove_first_occurrence_and_reorder(&4);
        assert_eq!(base.as_slice(), &[7]);
        base.remove_first_occurrence_and_reorder(&7);
        assert!(base.is_empty());
        base.clear_and_free(&allocator);
    }

    #[test]
    #[should_panic(expected = "value not found")]
    fn test_remove_missing_value_panics() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[1, 2], &allocator);
        base.remove_first_occurrence_and_reorder(&3);
    }

    #[test]
    fn test_search() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[3, 1, 4, 1, 5], &allocator);
        assert_eq!(base.index_try(&1), Some(1));
        assert_eq!(base.index_try(&9), None);
        assert_eq!(base.index(&5), 4);
        assert!(base.contains(&4));
        assert!(!base.contains(&2));
        base.clear_and_free(&allocator);
    }

    #[test]
    fn test_pop_and_remove_last() {
        let allocator = RawAllocator;
        let mut base = VectorBase::new();
        base.append("x".to_string(), &allocator);
        base.append("y".to_string(), &allocator);
        assert_eq!(base.last(), "y");
        base.last_mut().push('z');
        assert_eq!(base.pop_last(), "yz");
        base.remove_last();
        assert!(base.is_empty());
        base.clear_and_free(&allocator);
    }

    #[test]
    #[should_panic(expected = "pop_last() on an empty buffer")]
    fn test_pop_empty_panics() {
        let mut base = VectorBase::<i32>::new();
        base.pop_last();
    }

    #[test]
    #[should_panic(expected = "append_unchecked on a full buffer")]
    fn test_append_unchecked_full_panics() {
        let mut base = VectorBase::<i32>::new();
        base.append_unchecked(1);
    }

    #[test]
    fn test_append_helpers() {
        let allocator = TrackingAllocator::new();
        let mut base = VectorBase::new();
        assert_eq!(base.append_and_get_index(10, &allocator), 0);
        assert_eq!(base.append_and_get_index(10, &allocator), 1);
        base.append_non_duplicates(10, &allocator);
        base.append_non_duplicates(11, &allocator);
        assert_eq!(base.as_slice(), &[10, 10, 11]);
        base.append_n_times(&2, 3, &allocator);
        assert_eq!(base.as_slice(), &[10, 10, 11, 2, 2, 2]);
        base.extend_non_duplicates(&[1, 2, 3, 1], &allocator);
        assert_eq!(base.as_slice(), &[10, 10, 11, 2, 2, 2, 1, 3]);
        base.extend_from_iter(20..23, &allocator);
        assert_eq!(base.len(), 11);
        assert_eq!(base[10], 22);
        base.clear_and_free(&allocator);
    }

    #[test]
    fn test_fill() {
        let allocator = TrackingAllocator::new();
        let mut base = filled(&[0, 0, 0, 0, 0], &allocator);
        base.fill_indices(&[1, 2], &4);
        assert_eq!(base.as_slice(), &[0, 4, 4, 0, 0]);
        base.fill(&3);
        assert_eq!(base.as_slice(), &[3, 3, 3, 3, 3]);
        base[0] = 1;
        assert_eq!(base[0], 1);
        base.clear_and_free(&allocator);
    }

    #[derive(Clone)]
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_elements_dropped_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let allocator = TrackingAllocator::new();
        let mut base = VectorBase::new();
        for _ in 0..10 {
            base.append(DropCounter(drops.clone()), &allocator);
        }
        // Growth relocates without dropping.
        assert_eq!(drops.get(), 0);
        base.remove_and_reorder(3);
        assert_eq!(drops.get(), 1);
        base.remove_last();
        assert_eq!(drops.get(), 2);
        let popped = base.pop_last();
        assert_eq!(drops.get(), 2);
        drop(popped);
        assert_eq!(drops.get(), 3);
        base.clear_and_free(&allocator);
        assert_eq!(drops.get(), 10);
        assert_eq!(allocator.stats().live_blocks(), 0);
    }

    #[test]
    fn test_zero_sized_elements() {
        let allocator = TrackingAllocator::new();
        let mut base = VectorBase::new();
        for _ in 0..100 {
            base.append((), &allocator);
        }
        assert_eq!(base.len(), 100);
        assert_eq!(allocator.stats().live_bytes(), 0);
        base.clear_and_free(&allocator);
    }

    #[test]
    fn test_allocate_exact() {
        let allocator = TrackingAllocator::new();
        let mut base = VectorBase::<u32>::allocate_exact(5, &allocator);
        assert_eq!(base.capacity(), 5);
        assert_eq!(allocator.stats().live_bytes(), 20);
        base.extend(&[1, 2, 3, 4, 5], &allocator);
        assert_eq!(allocator.stats().allocations(), 1);
        base.append(6, &allocator);
        assert_eq!(base.capacity(), 8);
        base.clear_and_free(&allocator);
        assert_eq!(allocator.stats().live_bytes(), 0);
    }

    #[test]
    fn test_random_operations_match_std_vec() {
        let allocator = TrackingAllocator::new();
        let mut rng = fastrand::Rng::with_seed(42);
        let mut base = VectorBase::new();
        let mut model = Vec::new();
        for _ in 0..5000 {
            match rng.u8(0..6) {
                0 | 1 => {
                    let v = rng.u32(0..50);
                    base.append(v, &allocator);
                    model.push(v);
                }
                2 if !model.is_empty() => {
                    let i = rng.usize(0..model.len());
                    base.remove_and_reorder(i);
                    model.swap_remove(i);
                }
                3 if !model.is_empty() => {
                    assert_eq!(base.pop_last(), model.pop().unwrap());
                }
                4 => {
                    let v = rng.u32(0..50);
                    assert_eq!(base.index_try(&v), model.iter().position(|&x| x == v));
                }
                5 => {
                    let extra: Vec<u32> = (0..rng.usize(0..8)).map(|_| rng.u32(..)).collect();
                    base.extend(&extra, &allocator);
                    model.extend_from_slice(&extra);
                }
                _ => {}
            }
            assert_eq!(base.as_slice(), model.as_slice());
            assert!(base.capacity() >= base.len());
            assert!(base.capacity() == 0 || base.capacity().is_power_of_two());
        }
        base.clear_and_free(&allocator);
        assert_eq!(allocator.stats().live_blocks(), 0);
    }
}
