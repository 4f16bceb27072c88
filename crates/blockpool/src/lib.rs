//! # blockpool
//!
//! Fixed-size-block memory pool for hot, single-type allocation paths.
//!
//! A pool requests large blocks from an underlying allocator, carves them
//! into slots sized and aligned for one element type, and recycles freed
//! slots through a LIFO free list. The cost of a system allocation is paid
//! once per block instead of once per element.
//!
//! ## Quick Start
//!
//! ```rust
//! use blockpool::prelude::*;
//!
//! let mut pool = MemoryPool::<[f32; 4]>::with_block_size(4096)?;
//!
//! let point = pool.new_element([0.0, 1.0, 2.0, 3.0])?;
//! // SAFETY: `point` is a live element of `pool`
//! unsafe { pool.delete_element(Some(point)) };
//!
//! // The freed slot is handed out again first
//! let again = pool.new_element([4.0; 4])?;
//! assert_eq!(again, point);
//! # unsafe { pool.delete_element(Some(again)) };
//! # Ok::<(), PoolError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured `tracing` events for pool creation,
//!   block acquisition and teardown
//!
//! ## Architecture
//!
//! - [`allocator`]: where blocks come from ([`SystemAllocator`],
//!   [`TrackedAllocator`](allocator::TrackedAllocator))
//! - [`pool`]: block manager, slot allocator and the typed [`MemoryPool`]
//! - [`error`]: [`PoolError`] and [`ConstructError`]
//!
//! Pools are single-threaded. Dropping a pool releases every block at once
//! and does not run destructors of elements still live in it.

#![cfg_attr(docsrs, feature(doc_cfg))]
// Raw slot memory is the point of this crate
#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(unsafe_op_in_unsafe_fn)]
// Pointer alignment casts in slot handling are checked by SlotLayout
#![allow(clippy::cast_ptr_alignment)]

pub mod allocator;
pub mod error;
pub mod pool;
pub mod utils;

pub use crate::allocator::{Allocator, SystemAllocator};
pub use crate::error::{ConstructError, PoolError, PoolResult};
pub use crate::pool::{MemoryPool, PoolConfig, PoolStats, SlotAllocator, SlotLayout};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{Allocator, SystemAllocator, TrackedAllocator};
    pub use crate::error::{ConstructError, PoolError, PoolResult};
    pub use crate::pool::{MemoryPool, PoolConfig, PoolStats, SlotAllocator, SlotLayout};
}
