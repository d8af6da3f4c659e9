use std::{fmt, iter::FusedIterator, ptr};

use bas_alloc::Allocator;

use crate::Vector;

/// Consuming iterator over the elements of a [`Vector`].
///
/// Elements not yielded are dropped with the iterator; the storage is released after
/// that, through the vector's allocator.
pub struct IntoIter<T, const N: usize, A: Allocator> {
    vector: Vector<T, N, A>,
    front: usize,
    back: usize,
}

impl<T, const N: usize, A: Allocator> IntoIter<T, N, A> {
    /// Remaining elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            std::slice::from_raw_parts(
                self.vector.data_ptr().add(self.front),
                self.back - self.front,
            )
        }
    }
}

impl<T, const N: usize, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = unsafe { self.vector.data_ptr().add(self.front).read() };
        self.front += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.vector.data_ptr().add(self.back).read() })
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> FusedIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> Drop for IntoIter<T, N, A> {
    fn drop(&mut self) {
        let remaining = ptr::slice_from_raw_parts_mut(
            unsafe { self.vector.data_ptr().add(self.front) as *mut T },
            self.back - self.front,
        );
        self.front = self.back;
        unsafe { ptr::drop_in_place(remaining) };
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for IntoIter<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize, A: Allocator> IntoIterator for Vector<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(mut self) -> IntoIter<T, N, A> {
        let len = self.len();
        // The iterator owns the elements from here on; the vector keeps only the
        // storage.
        unsafe { self.forget_elements() };
        IntoIter {
            vector: self,
            front: 0,
            back: len,
        }
    }
}
