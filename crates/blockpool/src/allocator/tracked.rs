//! Tracked allocator implementation
//!
//! Wraps another [`Allocator`] and counts every block request that passes
//! through it. Pools only talk to their allocator when they acquire or
//! release whole blocks, so the counters measure block traffic, not slot
//! traffic.
//!
//! ## Invariants
//!
//! - Every successful allocation is counted exactly once
//! - Every deallocation adjusts the byte counter to match
//! - Failed allocations only bump the failure counter

use core::alloc::Layout;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::Allocator;
use crate::error::PoolResult;

/// Snapshot of [`TrackedAllocator`] counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Successful allocations
    pub allocation_count: usize,
    /// Deallocations
    pub deallocation_count: usize,
    /// Failed allocation attempts
    pub failed_allocations: usize,
    /// Bytes currently held by callers
    pub allocated_bytes: usize,
    /// High-water mark of `allocated_bytes`
    pub peak_allocated_bytes: usize,
}

/// A wrapper allocator that counts allocations and deallocations
///
/// Counters are atomics so a tracker can be shared by reference between a
/// pool and the test or harness that inspects it.
#[derive(Debug, Default)]
pub struct TrackedAllocator<A> {
    inner: A,
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    failures: AtomicUsize,
    current_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl<A> TrackedAllocator<A> {
    /// Creates a new TrackedAllocator wrapping the provided allocator
    pub fn new(allocator: A) -> Self {
        Self {
            inner: allocator,
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            current_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// Gets a reference to the underlying allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Consumes the tracker and returns the underlying allocator
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Returns the total number of successful allocations
    pub fn allocation_count(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Returns the total number of deallocations
    pub fn deallocation_count(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    /// Returns the number of failed allocations
    pub fn failed_allocations(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Returns the bytes currently allocated through this tracker
    pub fn allocated_bytes(&self) -> usize {
        self.current_bytes.load(Ordering::Relaxed)
    }

    /// Returns the peak bytes allocated
    pub fn peak_allocated_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }

    /// Number of allocations not yet deallocated
    pub fn outstanding(&self) -> usize {
        self.allocation_count()
            .saturating_sub(self.deallocation_count())
    }

    /// Check if there are any memory leaks (allocations > deallocations)
    pub fn has_leaks(&self) -> bool {
        self.outstanding() > 0
    }

    /// Get a statistics snapshot
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            allocation_count: self.allocation_count(),
            deallocation_count: self.deallocation_count(),
            failed_allocations: self.failed_allocations(),
            allocated_bytes: self.allocated_bytes(),
            peak_allocated_bytes: self.peak_allocated_bytes(),
        }
    }

    fn record_allocation(&self, size: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let current = self.current_bytes.fetch_add(size, Ordering::Relaxed) + size;
        self.peak_bytes.fetch_max(current, Ordering::Relaxed);
    }

    fn record_deallocation(&self, size: usize) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.current_bytes.fetch_sub(size, Ordering::Relaxed);
    }
}

// SAFETY: TrackedAllocator forwards to the inner allocator.
// - All unsafe calls go to A with the caller's arguments unchanged
// - Counter updates have no effect on memory validity
unsafe impl<A: Allocator> Allocator for TrackedAllocator<A> {
    unsafe fn allocate(&self, layout: Layout) -> PoolResult<NonNull<[u8]>> {
        // SAFETY: caller upholds A::allocate's contract
        match unsafe { self.inner.allocate(layout) } {
            Ok(ptr) => {
                self.record_allocation(layout.size());
                Ok(ptr)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.record_deallocation(layout.size());
        // SAFETY: caller upholds A::deallocate's contract
        unsafe { self.inner.deallocate(ptr, layout) };
    }
}
