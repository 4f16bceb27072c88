//! System allocator implementation
//!
//! Wraps the platform allocator (`std::alloc::System`) so that exhaustion is
//! reported as a [`PoolError`](crate::PoolError) instead of a null pointer.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::Allocator;
use crate::error::{PoolError, PoolResult};

/// Wrapper for the system's default allocator
///
/// This is the block source used when a pool is created without an explicit
/// allocator. It is zero-sized and stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new SystemAllocator
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }
}

// SAFETY: Delegates to std::alloc::System.
// - System returns null on failure, which is mapped to an error
// - Non-null results satisfy the requested layout (GlobalAlloc contract)
unsafe impl Allocator for SystemAllocator {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> PoolResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Err(PoolError::invalid_layout("zero-sized block request"));
        }

        // SAFETY: layout has non-zero size (checked above)
        let ptr = unsafe { System.alloc(layout) };

        match NonNull::new(ptr) {
            Some(ptr) => Ok(NonNull::slice_from_raw_parts(ptr, layout.size())),
            None => Err(PoolError::allocation_failed_with_layout(layout)),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr came from System.alloc with this layout (caller contract)
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_requested_layout() {
        let allocator = SystemAllocator::new();
        let layout = Layout::from_size_align(256, 16).unwrap();

        unsafe {
            let block = allocator.allocate(layout).unwrap();
            assert_eq!(block.len(), 256);
            assert_eq!(block.cast::<u8>().as_ptr() as usize % 16, 0);
            allocator.deallocate(block.cast(), layout);
        }
    }

    #[test]
    fn rejects_zero_sized_request() {
        let layout = Layout::from_size_align(0, 8).unwrap();
        let result = unsafe { SystemAllocator.allocate(layout) };
        assert!(matches!(result, Err(PoolError::InvalidLayout { .. })));
    }
}
