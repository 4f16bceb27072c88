//! Slot allocator
//!
//! The untyped allocation engine behind [`MemoryPool`](super::MemoryPool).
//! Requests are served in three tiers:
//!
//! 1. Pop the most recently freed slot off the free list
//! 2. Carve the next slot from the current block
//! 3. Acquire a new block, then carve its first slot
//!
//! # Safety
//!
//! ## Invariants
//!
//! - The free list and the uncarved region are disjoint; together they are
//!   every slot not currently handed out
//! - Every slot address lies inside an owned block and satisfies the slot
//!   alignment
//! - Blocks are released only when the allocator is dropped, regardless of
//!   how many slots are still handed out

use core::ptr::{self, NonNull};

#[cfg(feature = "logging")]
use tracing::debug;

use super::block::{BlockChain, CarveCursor};
use super::free_list::FreeList;
use super::layout::SlotLayout;
use super::stats::{PoolCounters, PoolStats};
use super::PoolConfig;
use crate::allocator::{Allocator, SystemAllocator};
use crate::error::{PoolError, PoolResult};
use crate::utils::is_aligned_ptr;

/// Fixed-size slot allocator
///
/// Hands out uninitialized, aligned slots of one [`SlotLayout`]. Memory is
/// obtained from `A` in blocks of `config.block_size` bytes and returned to
/// `A` only when the allocator is dropped.
///
/// # Memory Layout
/// ```text
/// block 0: [pad][slot][slot][slot]...[slot][tail]
/// block 1: [pad][slot][slot][slot]...[slot][tail]
///                                ^cursor  ^end
/// free list (top first): slot -> slot -> ...
/// ```
pub struct SlotAllocator<A: Allocator = SystemAllocator> {
    slot: SlotLayout,
    config: PoolConfig,
    blocks: BlockChain<A>,
    cursor: CarveCursor,
    free_list: FreeList,
    /// Free list room reserved so far, one entry per slot the blocks can yield
    reserved_slots: usize,
    live: usize,
    counters: PoolCounters,
}

impl SlotAllocator {
    /// Creates an allocator with default configuration over the system allocator
    pub fn new(slot: SlotLayout) -> PoolResult<Self> {
        Self::with_config(slot, PoolConfig::default())
    }

    /// Creates an allocator with custom configuration over the system allocator
    pub fn with_config(slot: SlotLayout, config: PoolConfig) -> PoolResult<Self> {
        Self::with_config_in(slot, config, SystemAllocator)
    }
}

impl<A: Allocator> SlotAllocator<A> {
    /// Creates an allocator drawing blocks from `allocator`
    ///
    /// The configuration is validated here; no block is acquired until the
    /// first allocation.
    ///
    /// # Errors
    /// Any error from [`PoolConfig::validate`].
    pub fn with_config_in(slot: SlotLayout, config: PoolConfig, allocator: A) -> PoolResult<Self> {
        let block_layout = config.validate(slot)?;

        #[cfg(feature = "logging")]
        debug!(
            slot_width = slot.width(),
            slot_align = slot.align(),
            block_size = config.block_size,
            "Created slot allocator"
        );

        Ok(Self::from_parts(slot, config, BlockChain::new(allocator, block_layout)))
    }

    fn from_parts(slot: SlotLayout, config: PoolConfig, blocks: BlockChain<A>) -> Self {
        Self {
            slot,
            config,
            blocks,
            cursor: CarveCursor::exhausted(),
            free_list: FreeList::new(),
            reserved_slots: 0,
            live: 0,
            counters: PoolCounters::default(),
        }
    }

    /// Creates an empty allocator with the same geometry and configuration
    pub fn empty_like(&self) -> Self
    where
        A: Clone,
    {
        let blocks = BlockChain::new(self.blocks.allocator().clone(), self.blocks.block_layout());
        Self::from_parts(self.slot, self.config, blocks)
    }

    /// Allocates one slot
    ///
    /// The returned memory is uninitialized (or filled with the configured
    /// alloc pattern), `slot_layout().width()` bytes long and aligned to
    /// `slot_layout().align()`.
    ///
    /// # Errors
    /// Returns [`PoolError::AllocationFailed`] when a new block is needed and
    /// the underlying allocator cannot provide one. The allocator's state is
    /// unchanged in that case.
    #[inline]
    pub fn allocate(&mut self) -> PoolResult<NonNull<u8>> {
        let slot = match self.free_list.pop() {
            Some(slot) => slot,
            None => match self.cursor.carve(self.slot.width()) {
                Some(slot) => slot,
                None => self.grow()?,
            },
        };

        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: slot is a whole, unused slot inside an owned block
            unsafe { ptr::write_bytes(slot.as_ptr(), pattern, self.slot.width()) };
        }

        self.live += 1;
        if self.config.track_stats {
            self.counters.record_alloc(self.live);
        }

        debug_assert!(is_aligned_ptr(slot.as_ptr(), self.slot.align()));
        Ok(slot)
    }

    /// Acquires a block and carves its first slot
    ///
    /// The free list is grown first to hold every slot the new block can
    /// yield, so [`deallocate`](Self::deallocate) never has to allocate.
    #[cold]
    fn grow(&mut self) -> PoolResult<NonNull<u8>> {
        let reserved = self
            .reserved_slots
            .checked_add(self.slot.slots_in(self.blocks.block_size()))
            .ok_or_else(|| PoolError::size_overflow("free list reservation"))?;
        self.free_list.reserve_total(reserved)?;

        let mut cursor = self.blocks.acquire(self.slot)?;
        self.reserved_slots = reserved;

        // A validated block always holds at least two slots
        let slot = cursor
            .carve(self.slot.width())
            .ok_or_else(|| PoolError::invalid_layout("acquired block holds no slot"))?;
        self.cursor = cursor;
        Ok(slot)
    }

    /// Returns a slot to the free list
    ///
    /// No destructor runs here; the slot's contents are simply abandoned.
    /// Never allocates: the free list already has room for every slot.
    ///
    /// # Safety
    /// - `slot` must have been returned by [`allocate`](Self::allocate) on
    ///   this same allocator
    /// - `slot` must not already be free (double-free is undefined behavior)
    ///
    /// Debug builds assert both conditions. Those checks walk every block and
    /// the whole free list, so `deallocate` is linear in debug builds and O(1)
    /// only in release builds.
    #[inline]
    pub unsafe fn deallocate(&mut self, slot: NonNull<u8>) {
        debug_assert!(self.owns(slot), "slot does not belong to this pool");
        #[cfg(debug_assertions)]
        {
            assert!(!self.free_list.contains(slot), "slot freed twice");
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: slot is a whole slot inside an owned block (caller contract)
            unsafe { ptr::write_bytes(slot.as_ptr(), pattern, self.slot.width()) };
        }

        self.free_list.push(slot);
        self.live -= 1;
        if self.config.track_stats {
            self.counters.record_dealloc();
        }
    }

    /// Checks if a pointer is a slot address inside one of this allocator's blocks
    ///
    /// Walks every block; meant for assertions and diagnostics.
    pub fn owns(&self, ptr: NonNull<u8>) -> bool {
        is_aligned_ptr(ptr.as_ptr(), self.slot.align()) && self.blocks.contains(ptr)
    }

    /// Upper bound on the number of slots this allocator could ever hold
    ///
    /// Derived from the number of blocks `usize` could address and the
    /// worst-case slots per block. Not enforced; the real ceiling is the
    /// underlying allocator running dry.
    pub fn max_slots(&self) -> usize {
        let block_size = self.blocks.block_size();
        (usize::MAX / block_size).saturating_mul(self.slot.min_slots_per_block(block_size))
    }

    /// Slot geometry
    #[inline]
    pub fn slot_layout(&self) -> SlotLayout {
        self.slot
    }

    /// Configuration the allocator was created with
    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Bytes per block
    #[inline]
    pub fn block_size(&self) -> usize {
        self.blocks.block_size()
    }

    /// Blocks acquired so far
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Slots currently handed out
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Slots that can be handed out without acquiring a block
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_list.len() + self.cursor.remaining(self.slot.width())
    }

    /// Underlying allocator
    #[inline]
    pub fn allocator(&self) -> &A {
        self.blocks.allocator()
    }

    /// Get statistics (if tracking is enabled)
    pub fn stats(&self) -> Option<PoolStats> {
        if !self.config.track_stats {
            return None;
        }

        Some(PoolStats {
            total_allocs: self.counters.total_allocs,
            total_deallocs: self.counters.total_deallocs,
            peak_live: self.counters.peak_live,
            live: self.live,
            blocks: self.blocks.len(),
            block_size: self.blocks.block_size(),
            slot_width: self.slot.width(),
            free_slots: self.free_count(),
        })
    }
}

impl<A: Allocator> core::fmt::Debug for SlotAllocator<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotAllocator")
            .field("slot", &self.slot)
            .field("block_size", &self.block_size())
            .field("blocks", &self.block_count())
            .field("live", &self.live)
            .field("free", &self.free_count())
            .finish()
    }
}

// SAFETY: SlotAllocator is Send because:
// - Every raw pointer it holds points into blocks it owns exclusively
// - Blocks are released through A, which is Send
// - No thread-local state; all mutation requires &mut self
unsafe impl<A: Allocator + Send> Send for SlotAllocator<A> {}
