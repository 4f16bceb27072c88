//! Underlying allocators
//!
//! Pools request whole blocks from an [`Allocator`]. Two are provided:
//! - [`SystemAllocator`] - the platform allocator
//! - [`TrackedAllocator`] - counts block traffic of any inner allocator

mod system;
mod tracked;
mod traits;

pub use system::SystemAllocator;
pub use tracked::{AllocatorStats, TrackedAllocator};
pub use traits::Allocator;
