//! Typed memory pool
//!
//! [`MemoryPool`] layers element construction and destruction on top of
//! [`SlotAllocator`]. Each slot moves through
//!
//! ```text
//! uncarved -> free -> live -> free -> live -> ... -> released at drop
//! ```
//!
//! `new_element*` takes a slot from free to live, `delete_element` takes it
//! back. Dropping the pool releases every block without visiting live
//! elements: their destructors do not run.
//!
//! # Safety
//!
//! The raw-pointer API (`allocate`, `deallocate`, `construct`, `destroy`,
//! `delete_element`) leaves slot state tracking to the caller. Each `unsafe`
//! method documents the state its pointer argument must be in.

use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use super::allocator::SlotAllocator;
use super::layout::SlotLayout;
use super::{PoolConfig, PoolStats};
use crate::allocator::{Allocator, SystemAllocator};
use crate::error::{ConstructError, PoolResult};

/// Fixed-size-block memory pool for elements of type `T`
///
/// Single-threaded: every mutating operation takes `&mut self`, and the pool
/// performs no synchronization of its own. Pools are move-only; there is no
/// `Clone`. [`take`](Self::take) moves the contents out and leaves an empty
/// pool behind.
///
/// # Examples
///
/// ```
/// use blockpool::MemoryPool;
///
/// let mut pool = MemoryPool::<String>::new()?;
/// let name = pool.new_element(String::from("block"))?;
/// assert_eq!(unsafe { name.as_ref() }, "block");
///
/// // SAFETY: `name` came from this pool and is live
/// unsafe { pool.delete_element(Some(name)) };
/// assert_eq!(pool.live_count(), 0);
/// # Ok::<(), blockpool::PoolError>(())
/// ```
pub struct MemoryPool<T, A: Allocator = SystemAllocator> {
    slots: SlotAllocator<A>,
    _marker: PhantomData<T>,
}

impl<T> MemoryPool<T> {
    /// Creates a pool with default configuration over the system allocator
    pub fn new() -> PoolResult<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a pool with the given block size and default settings otherwise
    pub fn with_block_size(block_size: usize) -> PoolResult<Self> {
        Self::with_config(PoolConfig::default().with_block_size(block_size))
    }

    /// Creates a pool with custom configuration over the system allocator
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        Self::with_config_in(config, SystemAllocator)
    }
}

impl<T, A: Allocator> MemoryPool<T, A> {
    /// Smallest valid block size for `T`
    ///
    /// Usable in const context to check a static block size at compile time:
    ///
    /// ```
    /// use blockpool::MemoryPool;
    ///
    /// const BLOCK: usize = 256;
    /// const _: () = assert!(BLOCK >= MemoryPool::<u64>::MIN_BLOCK_SIZE);
    /// ```
    pub const MIN_BLOCK_SIZE: usize = SlotLayout::of::<T>().min_block_size();

    /// Creates a pool drawing blocks from `allocator`
    ///
    /// # Errors
    /// Rejects block sizes that cannot hold two slots of `T`; see
    /// [`PoolConfig::validate`]. No block is requested in that case.
    pub fn with_config_in(config: PoolConfig, allocator: A) -> PoolResult<Self> {
        Ok(Self {
            slots: SlotAllocator::with_config_in(SlotLayout::of::<T>(), config, allocator)?,
            _marker: PhantomData,
        })
    }

    // ------------------------------------------------------------------
    // Raw slots
    // ------------------------------------------------------------------

    /// Allocates storage for one element without initializing it
    ///
    /// # Errors
    /// [`PoolError::AllocationFailed`](crate::PoolError::AllocationFailed) if
    /// a new block was needed and could not be obtained.
    #[inline]
    pub fn allocate(&mut self) -> PoolResult<NonNull<T>> {
        self.slots.allocate().map(NonNull::cast)
    }

    /// Returns storage to the pool without running any destructor
    ///
    /// # Safety
    /// - `ptr` must come from [`allocate`](Self::allocate) (or a
    ///   `new_element*` call) on this pool
    /// - `ptr` must not already be free
    /// - Any element at `ptr` must already be destroyed, or be one whose
    ///   destructor may be skipped
    ///
    /// Debug builds check the first two conditions by walking every block
    /// and the free list, which makes this call linear there.
    #[inline]
    pub unsafe fn deallocate(&mut self, ptr: NonNull<T>) {
        // SAFETY: forwarded caller contract
        unsafe { self.slots.deallocate(ptr.cast()) };
    }

    // ------------------------------------------------------------------
    // Construction and destruction
    // ------------------------------------------------------------------

    /// Moves `value` into an allocated, unconstructed slot
    ///
    /// # Safety
    /// `slot` must be allocated from this pool and hold no live element;
    /// a live element there would be overwritten without being dropped.
    #[inline]
    pub unsafe fn construct(&self, slot: NonNull<T>, value: T) -> NonNull<T> {
        // SAFETY: slot is valid, aligned storage for T (caller contract)
        unsafe { slot.as_ptr().write(value) };
        slot
    }

    /// Builds an element in `slot` from a fallible initializer
    ///
    /// On `Err` the slot is left unconstructed and still allocated.
    ///
    /// # Safety
    /// Same as [`construct`](Self::construct).
    pub unsafe fn construct_with<E>(
        &self,
        slot: NonNull<T>,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<NonNull<T>, E> {
        let value = init()?;
        // SAFETY: forwarded caller contract
        Ok(unsafe { self.construct(slot, value) })
    }

    /// Runs the element's destructor, keeping its storage allocated
    ///
    /// # Safety
    /// `ptr` must point to a live element allocated from this pool. The
    /// element must not be used again until it is reconstructed.
    #[inline]
    pub unsafe fn destroy(&self, ptr: NonNull<T>) {
        // SAFETY: ptr holds a live T (caller contract)
        unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    }

    // ------------------------------------------------------------------
    // Allocate + construct / destroy + deallocate
    // ------------------------------------------------------------------

    /// Allocates a slot and moves `value` into it
    #[inline]
    pub fn new_element(&mut self, value: T) -> PoolResult<NonNull<T>> {
        let slot = self.allocate()?;
        // SAFETY: slot was just allocated and holds no element
        Ok(unsafe { self.construct(slot, value) })
    }

    /// Allocates a slot and builds the element in it with `init`
    ///
    /// If `init` panics the slot is returned to the free list before the
    /// panic continues.
    pub fn new_element_with(&mut self, init: impl FnOnce() -> T) -> PoolResult<NonNull<T>> {
        let slot = self.allocate()?;
        let guard = SlotGuard::new(&mut self.slots, slot.cast());
        let value = init();
        guard.disarm();

        // SAFETY: slot was just allocated and holds no element
        Ok(unsafe { self.construct(slot, value) })
    }

    /// Allocates a slot and builds the element in it with a fallible `init`
    ///
    /// # Errors
    /// - [`ConstructError::Pool`] if no slot could be allocated
    /// - [`ConstructError::Init`] if `init` failed; the slot is already back
    ///   on the free list
    pub fn try_new_element_with<E>(
        &mut self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<NonNull<T>, ConstructError<E>> {
        let slot = self.allocate()?;
        let guard = SlotGuard::new(&mut self.slots, slot.cast());
        let value = init().map_err(ConstructError::Init)?;
        guard.disarm();

        // SAFETY: slot was just allocated and holds no element
        Ok(unsafe { self.construct(slot, value) })
    }

    /// Destroys an element and returns its slot to the pool
    ///
    /// `None` is a no-op.
    ///
    /// # Safety
    /// A `Some` pointer must point to a live element created by this pool,
    /// and must not be used afterwards.
    #[inline]
    pub unsafe fn delete_element(&mut self, ptr: Option<NonNull<T>>) {
        if let Some(ptr) = ptr {
            // SAFETY: ptr is a live element of this pool (caller contract)
            unsafe {
                self.destroy(ptr);
                self.deallocate(ptr);
            }
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Address of an element
    #[inline]
    pub fn address(&self, value: &T) -> *const T {
        ptr::from_ref(value)
    }

    /// Mutable address of an element
    #[inline]
    pub fn address_mut(&self, value: &mut T) -> *mut T {
        ptr::from_mut(value)
    }

    /// Upper bound on the number of elements the pool could ever hold
    #[inline]
    pub fn max_size(&self) -> usize {
        self.slots.max_slots()
    }

    /// Checks if `ptr` is a slot of this pool
    pub fn owns(&self, ptr: NonNull<T>) -> bool {
        self.slots.owns(ptr.cast())
    }

    /// Slots currently handed out
    #[inline]
    pub fn live_count(&self) -> usize {
        self.slots.live_count()
    }

    /// Slots available without acquiring another block
    #[inline]
    pub fn free_count(&self) -> usize {
        self.slots.free_count()
    }

    /// Blocks acquired so far
    #[inline]
    pub fn block_count(&self) -> usize {
        self.slots.block_count()
    }

    /// Bytes per block
    #[inline]
    pub fn block_size(&self) -> usize {
        self.slots.block_size()
    }

    /// Slot geometry for `T`
    #[inline]
    pub fn slot_layout(&self) -> SlotLayout {
        self.slots.slot_layout()
    }

    /// Configuration the pool was created with
    #[inline]
    pub fn config(&self) -> &PoolConfig {
        self.slots.config()
    }

    /// Underlying allocator
    #[inline]
    pub fn allocator(&self) -> &A {
        self.slots.allocator()
    }

    /// Get statistics (if tracking is enabled)
    pub fn stats(&self) -> Option<PoolStats> {
        self.slots.stats()
    }

    /// Moves the pool's contents out, leaving `self` empty
    ///
    /// All blocks, the carving cursor and the free list go to the returned
    /// pool. `self` keeps its configuration and a clone of the allocator but
    /// owns no blocks, so dropping it releases nothing.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self {
            slots: self.slots.empty_like(),
            _marker: PhantomData,
        };
        core::mem::replace(self, empty)
    }
}

impl<T, A: Allocator> core::fmt::Debug for MemoryPool<T, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryPool")
            .field("element", &core::any::type_name::<T>())
            .field("slots", &self.slots)
            .finish()
    }
}

/// Returns a reserved slot to the free list unless disarmed
///
/// Covers both an initializer returning `Err` and one that panics.
struct SlotGuard<'a, A: Allocator> {
    slots: &'a mut SlotAllocator<A>,
    slot: NonNull<u8>,
    armed: bool,
}

impl<'a, A: Allocator> SlotGuard<'a, A> {
    fn new(slots: &'a mut SlotAllocator<A>, slot: NonNull<u8>) -> Self {
        Self {
            slots,
            slot,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<A: Allocator> Drop for SlotGuard<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            // SAFETY: slot was allocated from these slots moments ago and
            // never constructed or freed
            unsafe { self.slots.deallocate(self.slot) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn small_pool<T>() -> MemoryPool<T> {
        MemoryPool::with_config(PoolConfig::production().with_block_size(256)).unwrap()
    }

    #[test]
    fn new_and_delete_element() {
        let mut pool = small_pool::<(u32, u32)>();
        let pair = pool.new_element((1, 2)).unwrap();
        assert_eq!(unsafe { *pair.as_ref() }, (1, 2));
        assert_eq!(pool.live_count(), 1);

        unsafe { pool.delete_element(Some(pair)) };
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn delete_runs_destructor_once() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = small_pool::<DropCounter>();

        let counter = pool.new_element(DropCounter(Rc::clone(&drops))).unwrap();
        unsafe { pool.delete_element(Some(counter)) };
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn delete_none_is_noop() {
        let mut pool = small_pool::<u64>();
        let kept = pool.new_element(7).unwrap();
        let free_before = pool.free_count();

        unsafe { pool.delete_element(None) };
        assert_eq!(pool.free_count(), free_before);
        assert_eq!(pool.live_count(), 1);
        assert_eq!(unsafe { *kept.as_ref() }, 7);
    }

    #[test]
    fn destroy_keeps_slot_allocated() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = small_pool::<DropCounter>();
        let slot = pool.new_element(DropCounter(Rc::clone(&drops))).unwrap();

        unsafe { pool.destroy(slot) };
        assert_eq!(drops.get(), 1);
        assert_eq!(pool.live_count(), 1);

        unsafe { pool.deallocate(slot) };
        assert_eq!(pool.live_count(), 0);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn failed_initializer_returns_slot() {
        let mut pool = small_pool::<String>();
        let free_before = pool.free_count();

        let err = pool
            .try_new_element_with(|| Err::<String, _>("no input"))
            .unwrap_err();
        assert!(matches!(err, ConstructError::Init("no input")));
        assert_eq!(pool.live_count(), 0);
        // First allocation carved a block; the slot went back on the free list
        assert_eq!(pool.free_count(), free_before + 256 / pool.slot_layout().width());
    }

    #[test]
    fn failed_initializer_slot_is_reused_next() {
        let mut pool = small_pool::<u64>();
        let probe = pool.allocate().unwrap();
        unsafe { pool.deallocate(probe) };

        let _ = pool.try_new_element_with(|| Err::<u64, _>(()));
        let next = pool.new_element(3).unwrap();
        assert_eq!(next, probe);
    }

    #[test]
    fn panicking_initializer_returns_slot() {
        let mut pool = small_pool::<u64>();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pool.new_element_with(|| panic!("initializer blew up"))
        }));
        assert!(result.is_err());
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.free_count(), 256 / 8);
    }

    #[test]
    fn construct_with_reports_initializer_error() {
        let mut pool = small_pool::<u64>();
        let slot = pool.allocate().unwrap();

        let result = unsafe { pool.construct_with(slot, || "nope".parse::<u64>()) };
        assert!(result.is_err());

        let built = unsafe { pool.construct_with(slot, || "42".parse::<u64>()) }.unwrap();
        assert_eq!(unsafe { *built.as_ref() }, 42);
        unsafe { pool.delete_element(Some(built)) };
    }

    #[test]
    fn address_is_identity() {
        let mut pool = small_pool::<u64>();
        let mut element = pool.new_element(5).unwrap();
        let reference = unsafe { element.as_mut() };

        assert_eq!(pool.address(reference), element.as_ptr().cast_const());
        assert_eq!(pool.address_mut(reference), element.as_ptr());
    }

    #[test]
    fn take_moves_everything() {
        let mut source = small_pool::<u64>();
        let element = source.new_element(11).unwrap();

        let mut moved = source.take();
        assert_eq!(source.block_count(), 0);
        assert_eq!(source.live_count(), 0);
        assert_eq!(source.free_count(), 0);
        assert_eq!(source.block_size(), 256);

        assert_eq!(moved.block_count(), 1);
        assert!(moved.owns(element));
        assert_eq!(unsafe { *element.as_ref() }, 11);
        unsafe { moved.delete_element(Some(element)) };
    }

    #[test]
    fn min_block_size_matches_layout() {
        assert_eq!(MemoryPool::<u64>::MIN_BLOCK_SIZE, 16);
        assert_eq!(MemoryPool::<[u8; 3]>::MIN_BLOCK_SIZE, 6);
    }

    #[test]
    fn pool_is_send_for_send_elements() {
        fn assert_send<S: Send>() {}
        assert_send::<MemoryPool<u64>>();
        assert_send::<MemoryPool<String>>();
    }
}
