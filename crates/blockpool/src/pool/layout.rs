//! Slot geometry
//!
//! A slot is the unit every pool operation works on: exactly one element's
//! worth of storage, padded to the element's alignment. Its geometry is
//! computed once, when the pool is created.

use core::alloc::Layout;
use core::mem::{align_of, size_of};

use crate::utils::align_up;

/// Alignment requested for every block
///
/// Blocks are requested at machine-word alignment. Elements with a stricter
/// alignment get padding in front of the first slot of each block.
pub const BLOCK_ALIGN: usize = align_of::<usize>();

/// Size and alignment of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotLayout {
    width: usize,
    align: usize,
}

impl SlotLayout {
    /// Slot geometry for elements of type `T`
    ///
    /// Zero-sized types still get a slot one alignment unit wide so every
    /// allocation has a distinct address.
    pub const fn of<T>() -> Self {
        Self::from_size_align(size_of::<T>(), align_of::<T>())
    }

    /// Slot geometry for an arbitrary element layout
    pub const fn from_layout(layout: Layout) -> Self {
        Self::from_size_align(layout.size(), layout.align())
    }

    const fn from_size_align(size: usize, align: usize) -> Self {
        let width = if size == 0 {
            align
        } else {
            align_up(size, align)
        };
        Self { width, align }
    }

    /// Distance in bytes between consecutive slots
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Alignment every slot address satisfies
    #[inline]
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Largest padding a block may need before its first slot
    #[inline]
    pub const fn max_padding(&self) -> usize {
        self.align.saturating_sub(BLOCK_ALIGN)
    }

    /// Smallest block that is guaranteed to hold two slots
    ///
    /// Saturates at `usize::MAX` for absurdly wide slots, which no valid
    /// block layout can reach.
    pub const fn min_block_size(&self) -> usize {
        self.width
            .saturating_mul(2)
            .saturating_add(self.max_padding())
    }

    /// Slots that fit in `usable` bytes
    #[inline]
    pub const fn slots_in(&self, usable: usize) -> usize {
        usable / self.width
    }

    /// Slots per block when the block needs the worst-case padding
    pub const fn min_slots_per_block(&self, block_size: usize) -> usize {
        self.slots_in(block_size.saturating_sub(self.max_padding()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(align(64))]
    struct CacheLine([u8; 64]);

    #[test]
    fn word_sized_elements() {
        let slot = SlotLayout::of::<u64>();
        assert_eq!(slot.width(), 8);
        assert_eq!(slot.align(), 8);
        assert_eq!(slot.max_padding(), 0);
        assert_eq!(slot.min_block_size(), 16);
        assert_eq!(slot.min_slots_per_block(64), 8);
    }

    #[test]
    fn zero_sized_elements_get_distinct_slots() {
        let slot = SlotLayout::of::<()>();
        assert_eq!(slot.width(), 1);
        assert_eq!(slot.min_block_size(), 2);
    }

    #[test]
    fn over_aligned_elements_reserve_padding() {
        let slot = SlotLayout::of::<CacheLine>();
        assert_eq!(slot.width(), 64);
        assert_eq!(slot.max_padding(), 64 - BLOCK_ALIGN);
        assert_eq!(slot.min_block_size(), 128 + 64 - BLOCK_ALIGN);
        assert_eq!(slot.min_slots_per_block(slot.min_block_size()), 2);
    }

    #[test]
    fn odd_sized_elements_are_rounded_to_alignment() {
        let slot = SlotLayout::from_layout(Layout::from_size_align(12, 8).unwrap());
        assert_eq!(slot.width(), 16);
    }

    #[test]
    fn min_block_size_saturates() {
        let slot = SlotLayout::from_size_align(usize::MAX / 2 + 1, 1);
        assert_eq!(slot.min_block_size(), usize::MAX);
    }
}
