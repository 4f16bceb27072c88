//! Pool statistics

/// Statistics for a memory pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total slot allocations performed
    pub total_allocs: u64,
    /// Total slot deallocations performed
    pub total_deallocs: u64,
    /// Highest number of simultaneously allocated slots
    pub peak_live: usize,
    /// Currently allocated slots
    pub live: usize,
    /// Blocks acquired from the underlying allocator
    pub blocks: usize,
    /// Size of each block
    pub block_size: usize,
    /// Distance between consecutive slots
    pub slot_width: usize,
    /// Slots ready to be handed out (free list plus uncarved)
    pub free_slots: usize,
}

impl PoolStats {
    /// Bytes of block memory held by the pool
    pub fn reserved_bytes(&self) -> usize {
        self.blocks * self.block_size
    }

    /// Bytes occupied by currently allocated slots
    pub fn live_bytes(&self) -> usize {
        self.live * self.slot_width
    }
}

/// Running counters, updated only when stats tracking is on
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PoolCounters {
    pub(crate) total_allocs: u64,
    pub(crate) total_deallocs: u64,
    pub(crate) peak_live: usize,
}

impl PoolCounters {
    #[inline]
    pub(crate) fn record_alloc(&mut self, live: usize) {
        self.total_allocs += 1;
        self.peak_live = self.peak_live.max(live);
    }

    #[inline]
    pub(crate) fn record_dealloc(&mut self) {
        self.total_deallocs += 1;
    }
}
