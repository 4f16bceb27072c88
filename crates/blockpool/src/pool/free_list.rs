//! Free list of returned slots
//!
//! Slots handed back by the caller are kept on a LIFO stack of handles held
//! beside the blocks, not inside the slots themselves. The most recently
//! freed slot is always reused first.
//!
//! Room for every slot a block can yield is reserved before the block is
//! acquired, so pushing a returned slot never allocates.

use core::mem::{align_of, size_of};
use core::ptr::NonNull;

use crate::error::{PoolError, PoolResult};

/// LIFO stack of free slot handles
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    slots: Vec<NonNull<u8>>,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Makes room for `total` slots in all
    ///
    /// Fails with [`PoolError::AllocationFailed`] instead of aborting when the
    /// heap refuses the growth. On failure the list is unchanged.
    pub(crate) fn reserve_total(&mut self, total: usize) -> PoolResult<()> {
        let additional = total.saturating_sub(self.slots.len());
        self.slots.try_reserve(additional).map_err(|_| {
            PoolError::allocation_failed(
                total.saturating_mul(size_of::<NonNull<u8>>()),
                align_of::<NonNull<u8>>(),
            )
        })
    }

    #[inline]
    pub(crate) fn push(&mut self, slot: NonNull<u8>) {
        debug_assert!(
            self.slots.len() < self.slots.capacity(),
            "free list pushed past its reservation"
        );
        self.slots.push(slot);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<NonNull<u8>> {
        self.slots.pop()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Linear scan, debug assertions only
    #[cfg(debug_assertions)]
    pub(crate) fn contains(&self, slot: NonNull<u8>) -> bool {
        self.slots.contains(&slot)
    }
}
