//! Pool configuration

use core::alloc::Layout;

use super::layout::{BLOCK_ALIGN, SlotLayout};
use crate::error::{PoolError, PoolResult};

/// Block size used when none is given
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Configuration for a memory pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Bytes requested from the underlying allocator per block
    pub block_size: usize,

    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated slots (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for deallocated slots (for debugging)
    pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            track_stats: cfg!(debug_assertions),
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
        }
    }
}

impl PoolConfig {
    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            track_stats: true,
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
        }
    }

    /// Performance configuration - minimal overhead, large blocks
    #[must_use]
    pub fn performance() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE * 16,
            ..Self::production()
        }
    }

    /// Sets the block size in bytes
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Enables or disables statistics tracking
    #[must_use]
    pub fn with_stats(mut self, track_stats: bool) -> Self {
        self.track_stats = track_stats;
        self
    }

    /// Sets both debug fill patterns
    #[must_use]
    pub fn with_patterns(mut self, alloc: Option<u8>, dealloc: Option<u8>) -> Self {
        self.alloc_pattern = alloc;
        self.dealloc_pattern = dealloc;
        self
    }

    /// Checks the configuration against a slot geometry
    ///
    /// Returns the layout every block will be requested with.
    ///
    /// # Errors
    /// - [`PoolError::SizeOverflow`] if two slots cannot be represented
    /// - [`PoolError::BlockTooSmall`] if a block cannot hold two slots plus
    ///   worst-case alignment padding
    /// - [`PoolError::InvalidLayout`] if the block size exceeds `isize::MAX`
    pub fn validate(&self, slot: SlotLayout) -> PoolResult<Layout> {
        let min_block_size = slot.min_block_size();
        if min_block_size == usize::MAX {
            return Err(PoolError::size_overflow("minimum block size"));
        }

        if self.block_size < min_block_size {
            return Err(PoolError::block_too_small(
                self.block_size,
                min_block_size,
                slot.width(),
            ));
        }

        Layout::from_size_align(self.block_size, BLOCK_ALIGN)
            .map_err(|_| PoolError::invalid_layout("block size exceeds isize::MAX"))
    }
}
