use bas_align::is_ptr_aligned;
use bas_common::error::ErrorKind;

use crate::{Allocator, MemoryBlock, RawAllocator, TrackingAllocator};

fn check_aligned_allocations<A: Allocator>(allocator: &A, alignment: usize) {
    let blocks = [
        allocator.allocate(1, alignment),
        allocator.allocate(alignment * 32, alignment),
        allocator.allocate(71, alignment),
    ];
    for block in blocks {
        assert!(
            is_ptr_aligned(block.as_ptr(), alignment),
            "{:?} not aligned to {alignment}",
            block.ptr()
        );
        assert_eq!(block.alignment(), alignment);
        // Touch every byte to make sure the whole block is usable.
        unsafe { block.as_ptr().write_bytes(0xAB, block.size()) };
    }
    for block in blocks {
        unsafe { allocator.free(block) };
    }
}

#[test]
fn test_raw_allocator_alignment() {
    let mut alignment = 1;
    while alignment <= 32768 {
        check_aligned_allocations(&RawAllocator, alignment);
        alignment *= 2;
    }
}

#[test]
fn test_raw_allocator_large_alignment() {
    let allocator = RawAllocator::new();
    let blocks = [
        allocator.allocate(1024, 512),
        allocator.allocate(1024, 512),
        allocator.allocate(1024, 512),
    ];
    for block in blocks {
        assert!(is_ptr_aligned(block.as_ptr(), 512));
        assert_eq!(block.size(), 1024);
    }
    assert_ne!(blocks[0].ptr(), blocks[1].ptr());
    assert_ne!(blocks[1].ptr(), blocks[2].ptr());
    for block in blocks {
        unsafe { allocator.free(block) };
    }
}

#[test]
fn test_size_not_multiple_of_alignment() {
    let block = RawAllocator.allocate(10, 4);
    assert_eq!(block.size(), 10);
    assert!(is_ptr_aligned(block.as_ptr(), 4));
    unsafe { RawAllocator.free(block) };
}

#[test]
fn test_zero_size_allocation() {
    let block = RawAllocator.allocate(0, 64);
    assert!(block.is_empty());
    assert!(is_ptr_aligned(block.as_ptr(), 64));
    assert_eq!(block, MemoryBlock::dangling(64));
    unsafe { RawAllocator.free(block) };
}

#[test]
fn test_try_allocate_rejects_bad_alignment() {
    let err = RawAllocator.try_allocate(16, 3).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));

    let err = RawAllocator.try_allocate(16, 0).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
}

#[test]
fn test_try_allocate_rejects_oversized_request() {
    let err = RawAllocator.try_allocate(usize::MAX - 8, 16).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::CapacityOverflow));
}

#[test]
#[should_panic(expected = "alignment must be a power of two")]
fn test_allocate_panics_on_bad_alignment() {
    RawAllocator.allocate(16, 12);
}

#[test]
fn test_block_accessors() {
    let block = RawAllocator.allocate(100, 16);
    assert!(block.contains(block.as_ptr()));
    assert!(block.contains(block.ptr_at(99).as_ptr()));
    assert!(!block.contains(block.ptr_at(100).as_ptr()));
    assert_eq!(block.layout().size(), 100);
    assert_eq!(block.layout().align(), 16);
    unsafe { RawAllocator.free(block) };
}

#[test]
fn test_tracking_allocator_counts() {
    let allocator = TrackingAllocator::new();
    let stats = allocator.stats();

    let a = allocator.allocate(100, 8);
    let b = allocator.allocate(28, 4);
    assert_eq!(stats.allocations(), 2);
    assert_eq!(stats.live_blocks(), 2);
    assert_eq!(stats.live_bytes(), 128);
    assert_eq!(stats.peak_live_bytes(), 128);

    unsafe { allocator.free(a) };
    assert_eq!(stats.frees(), 1);
    assert_eq!(stats.live_bytes(), 28);

    let c = allocator.allocate(50, 8);
    assert_eq!(stats.peak_live_bytes(), 128);
    assert_eq!(stats.total_bytes(), 178);

    unsafe {
        allocator.free(b);
        allocator.free(c);
    }
    assert_eq!(stats.live_blocks(), 0);
    assert_eq!(stats.live_bytes(), 0);
}

#[test]
fn test_tracking_allocator_clones_share_stats() {
    let allocator = TrackingAllocator::new();
    let clone = allocator.clone();
    let block = clone.allocate(8, 8);
    assert_eq!(allocator.stats().allocations(), 1);
    unsafe { allocator.free(block) };
    assert_eq!(clone.stats().live_blocks(), 0);
}

#[test]
fn test_tracking_allocator_records_failures() {
    let allocator = TrackingAllocator::new();
    assert!(allocator.try_allocate(8, 6).is_err());
    assert_eq!(allocator.stats().failures(), 1);
    assert_eq!(allocator.stats().allocations(), 0);
}

#[test]
fn test_allocator_by_reference() {
    fn allocate_through<A: Allocator>(allocator: A) -> MemoryBlock {
        allocator.allocate(32, 32)
    }

    let allocator = TrackingAllocator::new();
    let block = allocate_through(&allocator);
    assert!(is_ptr_aligned(block.as_ptr(), 32));
    assert_eq!(allocator.stats().allocations(), 1);
    unsafe { (&allocator).free(block) };
    assert_eq!(allocator.stats().frees(), 1);
}

#[test]
fn test_random_allocations_are_disjoint() {
    let allocator = TrackingAllocator::new();
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let mut blocks = Vec::new();
    for i in 0..200 {
        let alignment = 1usize << rng.usize(0..12);
        let size = rng.usize(1..4096);
        let block = allocator.allocate(size, alignment);
        assert!(is_ptr_aligned(block.as_ptr(), alignment));
        unsafe { block.as_ptr().write_bytes(i as u8, size) };
        blocks.push((block, i as u8));
    }
    for (block, fill) in &blocks {
        let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), block.size()) };
        assert!(bytes.iter().all(|b| b == fill));
    }
    for (block, _) in blocks {
        unsafe { allocator.free(block) };
    }
    assert_eq!(allocator.stats().live_bytes(), 0);
}
