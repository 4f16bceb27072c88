//! Fixed-size-block memory pool
//!
//! Hands out same-sized slots from large blocks and recycles freed slots
//! LIFO. Provides amortized O(1) allocation/deallocation for one element type.
//!
//! ## Modules
//! - `allocator` - Untyped slot allocator: free list, carving, growth
//! - `block` - Block manager: acquisition, alignment padding, bulk release
//! - `config` - Configuration variants (production, debug, performance)
//! - `free_list` - LIFO stack of returned slots
//! - `layout` - Slot geometry
//! - `memory_pool` - Typed pool with construct/destroy
//! - `stats` - Statistics tracking types

pub mod allocator;
mod block;
pub mod config;
mod free_list;
pub mod layout;
pub mod memory_pool;
pub mod stats;

pub use allocator::SlotAllocator;
pub use config::{DEFAULT_BLOCK_SIZE, PoolConfig};
pub use layout::{BLOCK_ALIGN, SlotLayout};
pub use memory_pool::MemoryPool;
pub use stats::PoolStats;
