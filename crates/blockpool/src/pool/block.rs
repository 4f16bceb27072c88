//! Block manager
//!
//! Acquires fixed-size chunks from the underlying [`Allocator`], keeps them
//! in an owned list for bulk release, and hands out a [`CarveCursor`] over
//! the aligned slot run of the newest block.
//!
//! # Safety
//!
//! - Every pointer in `blocks` came from `allocator.allocate(block_layout)`
//!   and is released exactly once, in `Drop`
//! - A cursor only ever yields addresses inside its own block, each at a
//!   whole number of slot widths past the aligned start
//! - Blocks are never released while the chain is alive, so cursors and
//!   carved slots stay valid for the chain's lifetime

use core::alloc::Layout;
use core::mem::{align_of, size_of};
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::debug;

use super::layout::SlotLayout;
use crate::allocator::Allocator;
use crate::error::{PoolError, PoolResult};
use crate::utils::padding_needed;

/// Uncarved remainder of the current block
///
/// `next` and `end` are byte offsets from the block base. A slot can be
/// carved while `next < end`; `end` is the first offset past which a whole
/// slot no longer fits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CarveCursor {
    base: Option<NonNull<u8>>,
    next: usize,
    end: usize,
}

impl CarveCursor {
    /// Cursor with nothing left to carve
    pub(crate) const fn exhausted() -> Self {
        Self {
            base: None,
            next: 0,
            end: 0,
        }
    }

    /// Cuts the next slot off the block, if a whole slot remains
    #[inline]
    pub(crate) fn carve(&mut self, width: usize) -> Option<NonNull<u8>> {
        let base = self.base?;
        if self.next >= self.end {
            return None;
        }

        // SAFETY: next < end <= block size, so the offset stays in the block
        let slot = unsafe { base.add(self.next) };
        self.next += width;
        Some(slot)
    }

    /// Slots still carvable from this block
    #[inline]
    pub(crate) fn remaining(&self, width: usize) -> usize {
        (self.end - self.next) / width
    }
}

/// Owned chain of every block a pool has acquired
pub(crate) struct BlockChain<A: Allocator> {
    allocator: A,
    block_layout: Layout,
    blocks: Vec<NonNull<u8>>,
}

impl<A: Allocator> BlockChain<A> {
    /// Creates an empty chain; no memory is requested yet
    pub(crate) fn new(allocator: A, block_layout: Layout) -> Self {
        Self {
            allocator,
            block_layout,
            blocks: Vec::new(),
        }
    }

    /// Acquires a new block and returns a cursor over its slots
    ///
    /// The new block becomes the current block. On failure the chain is
    /// unchanged and the error is handed straight back; nothing is retried.
    pub(crate) fn acquire(&mut self, slot: SlotLayout) -> PoolResult<CarveCursor> {
        // Reserve first so a full Vec can't strand a freshly allocated block
        self.blocks.try_reserve(1).map_err(|_| {
            PoolError::allocation_failed(
                (self.blocks.len() + 1).saturating_mul(size_of::<NonNull<u8>>()),
                align_of::<NonNull<u8>>(),
            )
        })?;

        // SAFETY: block_layout was validated by PoolConfig::validate and has
        // non-zero size (at least two slots)
        let raw = unsafe { self.allocator.allocate(self.block_layout)? };
        let base = raw.cast::<u8>();

        let block_size = self.block_layout.size();
        let padding = padding_needed(base.as_ptr().addr(), slot.align());
        if padding > slot.max_padding() || padding >= block_size {
            // SAFETY: base came from allocate with block_layout just above
            unsafe { self.allocator.deallocate(base, self.block_layout) };
            return Err(PoolError::invalid_layout(
                "allocator returned a block that cannot be aligned for the slot type",
            ));
        }

        let slots = slot.slots_in(block_size - padding);
        self.blocks.push(base);

        #[cfg(feature = "logging")]
        debug!(
            block = self.blocks.len() - 1,
            padding, slots, "Acquired pool block"
        );

        Ok(CarveCursor {
            base: Some(base),
            next: padding,
            end: padding + slots * slot.width(),
        })
    }

    /// Number of blocks acquired so far
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes per block
    #[inline]
    pub(crate) fn block_size(&self) -> usize {
        self.block_layout.size()
    }

    /// Layout every block is requested with
    #[inline]
    pub(crate) fn block_layout(&self) -> Layout {
        self.block_layout
    }

    /// Underlying allocator
    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Whether `ptr` points into any block of this chain
    pub(crate) fn contains(&self, ptr: NonNull<u8>) -> bool {
        let addr = ptr.as_ptr() as usize;
        let size = self.block_size();
        self.blocks.iter().any(|block| {
            let start = block.as_ptr() as usize;
            addr >= start && addr < start + size
        })
    }
}

impl<A: Allocator> Drop for BlockChain<A> {
    fn drop(&mut self) {
        #[cfg(feature = "logging")]
        {
            if !self.blocks.is_empty() {
                debug!(blocks = self.blocks.len(), "Releasing pool blocks");
            }
        }

        for block in self.blocks.drain(..) {
            // SAFETY: every entry came from allocate(block_layout) in acquire
            // and is released exactly once here
            unsafe { self.allocator.deallocate(block, self.block_layout) };
        }
    }
}
