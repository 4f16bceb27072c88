//! Error types for blockpool
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // --- Configuration Errors ---
    #[error(
        "Block size {block_size} bytes is too small: need at least {min_block_size} bytes for {slot_width}-byte slots"
    )]
    BlockTooSmall {
        block_size: usize,
        min_block_size: usize,
        slot_width: usize,
    },

    #[error("Invalid block layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: String },

    // --- Allocation Errors ---
    #[error("Block allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },
}

impl PoolError {
    /// Check if error is retryable
    ///
    /// Only a failed block request may succeed later; configuration errors
    /// never do. The pool itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlockTooSmall { .. } => "POOL:CONFIG:BLOCK_TOO_SMALL",
            Self::InvalidLayout { .. } => "POOL:CONFIG:LAYOUT",
            Self::SizeOverflow { .. } => "POOL:CONFIG:OVERFLOW",
            Self::AllocationFailed { .. } => "POOL:ALLOC:FAILED",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create block too small error
    pub fn block_too_small(block_size: usize, min_block_size: usize, slot_width: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(
            block_size,
            min_block_size, slot_width, "Rejected pool configuration: block size too small"
        );

        Self::BlockTooSmall {
            block_size,
            min_block_size,
            slot_width,
        }
    }

    /// Create invalid layout error
    pub fn invalid_layout(reason: &str) -> Self {
        Self::InvalidLayout {
            reason: reason.to_string(),
        }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &str) -> Self {
        Self::SizeOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(size, align, "Block allocation failed");

        Self::AllocationFailed { size, align }
    }

    /// Create allocation failed error from layout
    pub fn allocation_failed_with_layout(layout: Layout) -> Self {
        Self::allocation_failed(layout.size(), layout.align())
    }
}

/// Failure of a fallible element construction
///
/// `Init` carries the initializer's own error. By the time it is returned the
/// slot that was reserved for the element is back on the free list.
#[derive(Error, Debug)]
pub enum ConstructError<E> {
    /// No slot could be obtained for the element
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The element initializer reported a failure
    #[error("element initializer failed: {0}")]
    Init(#[source] E),
}

impl<E> ConstructError<E> {
    /// Returns the initializer error, if that is what failed
    pub fn into_init(self) -> Option<E> {
        match self {
            Self::Init(err) => Some(err),
            Self::Pool(_) => None,
        }
    }

    /// Returns the pool error, if that is what failed
    pub fn pool_error(&self) -> Option<&PoolError> {
        match self {
            Self::Pool(err) => Some(err),
            Self::Init(_) => None,
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for pool operations
pub type PoolResult<T> = core::result::Result<T, PoolError>;

// ============================================================================
// Tests
// ============================================================================
