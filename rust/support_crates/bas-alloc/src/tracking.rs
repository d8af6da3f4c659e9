//! `TrackingAllocator`: an allocator wrapper that keeps allocation statistics.
//!
//! The statistics live behind a shared, single-threaded handle: cloning a
//! `TrackingAllocator` (as containers do when they are cloned) keeps reporting into
//! the same [`AllocationStats`].

use std::{cell::Cell, rc::Rc};

use bas_common::Result;

use crate::{Allocator, MemoryBlock, RawAllocator};

/// Wraps an allocator and counts every allocation and free that goes through it.
#[derive(Debug, Clone, Default)]
pub struct TrackingAllocator<A = RawAllocator> {
    inner: A,
    stats: AllocationStats,
}

impl TrackingAllocator<RawAllocator> {
    /// Creates a tracking allocator over the default [`RawAllocator`].
    pub fn new() -> TrackingAllocator<RawAllocator> {
        TrackingAllocator::wrap(RawAllocator)
    }
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Creates a tracking allocator over `inner` with fresh statistics.
    pub fn wrap(inner: A) -> TrackingAllocator<A> {
        TrackingAllocator {
            inner,
            stats: AllocationStats::default(),
        }
    }

    /// Returns a handle to the statistics shared by this allocator and its clones.
    pub fn stats(&self) -> AllocationStats {
        self.stats.clone()
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

unsafe impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn try_allocate(&self, size: usize, alignment: usize) -> Result<MemoryBlock> {
        match self.inner.try_allocate(size, alignment) {
            Ok(block) => {
                self.stats.record_allocation(block.size());
                Ok(block)
            }
            Err(e) => {
                self.stats.0.failures.set(self.stats.0.failures.get() + 1);
                Err(e)
            }
        }
    }

    unsafe fn free(&self, block: MemoryBlock) {
        self.stats.record_free(block.size());
        unsafe { self.inner.free(block) }
    }
}

/// Shared allocation counters.
#[derive(Debug, Clone, Default)]
pub struct AllocationStats(Rc<StatsInner>);

#[derive(Debug, Default)]
struct StatsInner {
    allocations: Cell<usize>,
    frees: Cell<usize>,
    failures: Cell<usize>,
    live_bytes: Cell<usize>,
    peak_live_bytes: Cell<usize>,
    total_bytes: Cell<usize>,
}

impl AllocationStats {
    /// Number of successful allocations.
    pub fn allocations(&self) -> usize {
        self.0.allocations.get()
    }

    pub fn frees(&self) -> usize {
        self.0.frees.get()
    }

    /// Number of requests the wrapped allocator refused.
    pub fn failures(&self) -> usize {
        self.0.failures.get()
    }

    /// Blocks allocated and not yet freed.
    pub fn live_blocks(&self) -> usize {
        self.allocations() - self.frees()
    }

    pub fn live_bytes(&self) -> usize {
        self.0.live_bytes.get()
    }

    /// High-water mark of `live_bytes`.
    pub fn peak_live_bytes(&self) -> usize {
        self.0.peak_live_bytes.get()
    }

    /// Sum of the sizes of all successful allocations.
    pub fn total_bytes(&self) -> usize {
        self.0.total_bytes.get()
    }

    fn record_allocation(&self, size: usize) {
        let s = &self.0;
        s.allocations.set(s.allocations.get() + 1);
        s.total_bytes.set(s.total_bytes.get() + size);
        let live = s.live_bytes.get() + size;
        s.live_bytes.set(live);
        if live > s.peak_live_bytes.get() {
            s.peak_live_bytes.set(live);
        }
    }

    fn record_free(&self, size: usize) {
        let s = &self.0;
        debug_assert!(s.frees.get() < s.allocations.get(), "free without allocation");
        debug_assert!(s.live_bytes.get() >= size);
        s.frees.set(s.frees.get() + 1);
        s.live_bytes.set(s.live_bytes.get() - size);
    }
}
