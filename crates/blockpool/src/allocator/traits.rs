//! Block source trait
//!
//! The pool never talks to the global heap directly. Every block it carves
//! comes from an [`Allocator`], which lets tests count acquisitions or inject
//! failures without touching the pool's hot path.
//!
//! # Safety
//!
//! Implementors promise that:
//! - Returned pointers are valid for reads and writes of `layout.size()` bytes
//! - Returned pointers satisfy `layout.align()`
//! - Memory stays valid until passed back to `deallocate` with the same layout
//!
//! The blanket impl for `&A` forwards every call to `A` and adds no unsafe
//! operations of its own.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::PoolResult;

/// Source of raw, uninitialized memory chunks
///
/// # Safety Requirements
///
/// Implementors must ensure that:
/// - Returned pointers are valid for the requested lifetime
/// - Memory is properly aligned according to the layout
/// - Deallocation only occurs for previously allocated pointers
pub unsafe trait Allocator {
    /// Allocates memory with the given layout
    ///
    /// # Safety
    /// - `layout` must have a non-zero size
    /// - Memory content is uninitialized and must be initialized before use
    ///
    /// # Errors
    /// Returns [`PoolError::AllocationFailed`](crate::PoolError::AllocationFailed)
    /// when the memory cannot be obtained.
    unsafe fn allocate(&self, layout: Layout) -> PoolResult<NonNull<[u8]>>;

    /// Deallocates memory at the given pointer with the specified layout
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator
    /// - `layout` must match the original allocation layout exactly
    /// - After this call, `ptr` becomes invalid and must not be used
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: Forwarding impl for shared references.
// - Every call is delegated to A's implementation with the same arguments
// - A's safety contract is preserved unchanged
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> PoolResult<NonNull<[u8]>> {
        // SAFETY: caller upholds A::allocate's contract
        unsafe { (**self).allocate(layout) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller upholds A::deallocate's contract
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
