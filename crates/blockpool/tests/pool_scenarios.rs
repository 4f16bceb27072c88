//! Integration tests for MemoryPool allocation behavior

use blockpool::allocator::{SystemAllocator, TrackedAllocator};
use blockpool::{MemoryPool, PoolConfig, PoolError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn config(block_size: usize) -> PoolConfig {
    PoolConfig::production().with_block_size(block_size)
}

#[test]
fn test_ten_elements_span_two_blocks() {
    let tracker = TrackedAllocator::new(SystemAllocator);
    let mut pool = MemoryPool::<u64, _>::with_config_in(config(64), &tracker).unwrap();

    let elements: Vec<_> = (0..10).map(|i| pool.new_element(i).unwrap()).collect();

    assert!(tracker.allocation_count() >= 2);
    assert_eq!(pool.block_count(), tracker.allocation_count());
    for (i, element) in elements.iter().enumerate() {
        assert_eq!(unsafe { *element.as_ref() }, i as u64);
    }
}

#[test]
fn test_lifo_reuse_of_freed_slots() {
    let mut pool = MemoryPool::<u64>::with_config(config(4096)).unwrap();
    let [a, b, c, d, e] = [1, 2, 3, 4, 5].map(|v| pool.new_element(v).unwrap());
    let _ = (a, b);

    unsafe {
        pool.delete_element(Some(e));
        pool.delete_element(Some(d));
        pool.delete_element(Some(c));
    }

    let x = pool.new_element(6).unwrap();
    let y = pool.new_element(7).unwrap();
    let z = pool.new_element(8).unwrap();
    assert_eq!((x, y, z), (c, d, e));
}

#[test]
fn test_delete_null_is_noop() {
    let mut pool = MemoryPool::<u32>::with_config(config(64)).unwrap();
    let live = pool.new_element(1).unwrap();
    let freed = pool.new_element(2).unwrap();
    unsafe { pool.delete_element(Some(freed)) };

    let (free, live_count) = (pool.free_count(), pool.live_count());
    unsafe { pool.delete_element(None) };

    assert_eq!(pool.free_count(), free);
    assert_eq!(pool.live_count(), live_count);
    assert_eq!(unsafe { *live.as_ref() }, 1);
}

#[test]
fn test_reconstruct_in_place_leaves_no_residue() {
    let mut pool = MemoryPool::<Vec<u32>>::with_config(config(256)).unwrap();
    let slot = pool.new_element(vec![1, 2, 3, 4]).unwrap();

    unsafe {
        pool.destroy(slot);
        let rebuilt = pool.construct(slot, Vec::with_capacity(1));
        assert_eq!(rebuilt, slot);
        assert!(rebuilt.as_ref().is_empty());
        assert_eq!(rebuilt.as_ref().capacity(), 1);
        pool.delete_element(Some(rebuilt));
    }
    assert_eq!(pool.live_count(), 0);
}

#[test]
fn test_addresses_unique_without_deallocation() {
    let mut pool = MemoryPool::<u16>::with_config(config(64)).unwrap();
    let mut addrs: Vec<usize> = (0..500)
        .map(|_| pool.allocate().unwrap().as_ptr() as usize)
        .collect();

    addrs.sort_unstable();
    addrs.dedup();
    assert_eq!(addrs.len(), 500);
}

#[test]
fn test_misconfiguration_rejected_before_allocation() {
    let tracker = TrackedAllocator::new(SystemAllocator);
    let result = MemoryPool::<u64, _>::with_config_in(config(15), &tracker);

    assert!(matches!(
        result,
        Err(PoolError::BlockTooSmall {
            block_size: 15,
            min_block_size: 16,
            slot_width: 8
        })
    ));
    assert_eq!(tracker.allocation_count(), 0);
}

#[test]
fn test_growth_after_slots_per_block() {
    let tracker = TrackedAllocator::new(SystemAllocator);
    let mut pool = MemoryPool::<[u64; 2], _>::with_config_in(config(160), &tracker).unwrap();
    let per_block = 160 / pool.slot_layout().width();

    for _ in 0..per_block {
        pool.allocate().unwrap();
    }
    assert_eq!(tracker.allocation_count(), 1);

    pool.allocate().unwrap();
    assert_eq!(tracker.allocation_count(), 2);
}

#[repr(align(32))]
struct Aligned32([u8; 40]);

#[repr(align(128))]
struct Aligned128(u8);

#[rstest]
#[case(512)]
#[case(1000)]
#[case(4096)]
fn test_over_aligned_slots(#[case] block_size: usize) {
    let mut pool = MemoryPool::<Aligned32>::with_config(config(block_size)).unwrap();
    for _ in 0..100 {
        let slot = pool.new_element(Aligned32([7; 40])).unwrap();
        assert_eq!(slot.as_ptr() as usize % 32, 0);
    }

    let mut wide = MemoryPool::<Aligned128>::with_config(config(block_size)).unwrap();
    for _ in 0..20 {
        let slot = wide.new_element(Aligned128(1)).unwrap();
        assert_eq!(slot.as_ptr() as usize % 128, 0);
    }
}

#[rstest]
#[case(16)]
#[case(24)]
#[case(64)]
#[case(4096)]
fn test_minimum_and_odd_block_sizes(#[case] block_size: usize) {
    let mut pool = MemoryPool::<u64>::with_config(config(block_size)).unwrap();
    let expected_per_block = block_size / 8;

    for _ in 0..expected_per_block * 3 {
        pool.allocate().unwrap();
    }
    assert_eq!(pool.block_count(), 3);
    assert_eq!(pool.free_count(), 0);
}

#[test]
fn test_zero_sized_elements_get_distinct_addresses() {
    let mut pool = MemoryPool::<()>::with_config(config(16)).unwrap();
    let a = pool.new_element(()).unwrap();
    let b = pool.new_element(()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_max_size_is_upper_bound() {
    let pool = MemoryPool::<u64>::with_config(config(4096)).unwrap();
    assert!(pool.max_size() >= usize::MAX / 4096);
    assert_eq!(pool.max_size(), (usize::MAX / 4096) * 512);
}

#[test]
fn test_stats_track_churn() {
    let mut pool = MemoryPool::<u64>::with_config(config(64).with_stats(true)).unwrap();
    for round in 0..10 {
        let element = pool.new_element(round).unwrap();
        unsafe { pool.delete_element(Some(element)) };
    }

    let stats = pool.stats().unwrap();
    assert_eq!(stats.total_allocs, 10);
    assert_eq!(stats.total_deallocs, 10);
    assert_eq!(stats.peak_live, 1);
    assert_eq!(stats.live, 0);
    assert_eq!(stats.blocks, 1);
}
