//! Fixed-size slab pool with O(1) allocate and free.
//!
//! Elements live in blocks of `block_capacity` slots. A block is appended
//! when the current one is full and is never resized, so a live element
//! never moves. Freed slots form an intrusive LIFO free list and are reused
//! before any fresh slot. Blocks are only released when the pool is dropped.
//!
//! # Example
//!
//! ```ignore
//! let mut pool = SlotPool::new();
//! let a = pool.allocate(10u64);
//! let b = pool.allocate(20u64);
//! assert_eq!(pool.deallocate(a), 10);  // slot of `a` is now free
//! let c = pool.allocate(30u64);        // reuses the slot of `a`
//! assert_eq!(c, a);
//! ```

use std::mem;
use std::ops::{Index, IndexMut};
use crate::error::Result;
use crate::{engine_bail, engine_fatal, engine_trace};

const SOURCE: &str = "galaxy3d::SlotPool";

/// Block size in bytes used by `SlotPool::new()`
pub const DEFAULT_BLOCK_BYTES: usize = 4096;

/// Handle to a live element of a SlotPool.
///
/// Stable for the lifetime of the element; becomes invalid once the
/// element is deallocated (the slot may then be handed out again).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotHandle(u32);

impl SlotHandle {
    /// Global slot index (block * block_capacity + offset)
    pub fn index(self) -> u32 {
        self.0
    }
}

enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<u32> },
}

pub struct SlotPool<T> {
    /// Oldest block first. Each inner Vec is created with exactly
    /// `block_capacity` and never pushed past it.
    blocks: Vec<Vec<Slot<T>>>,
    block_capacity: usize,
    free_head: Option<u32>,
    len: usize,
}

impl<T> SlotPool<T> {
    /// Create an empty pool using blocks of `DEFAULT_BLOCK_BYTES`
    ///
    /// No block is allocated until the first element is.
    pub fn new() -> Self {
        let slot_size = mem::size_of::<Slot<T>>().max(1);
        Self::with_capacity_unchecked((DEFAULT_BLOCK_BYTES / slot_size).max(2))
    }

    /// Create an empty pool with `block_capacity` slots per block
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `block_capacity` is below 2.
    pub fn with_block_capacity(block_capacity: usize) -> Result<Self> {
        if block_capacity < 2 {
            engine_bail!(SOURCE, "Block capacity must be at least 2 slots (got {})", block_capacity);
        }
        if block_capacity > Self::index_space() {
            engine_bail!(SOURCE,
                "Block capacity {} exceeds the addressable slot count {}",
                block_capacity, Self::index_space());
        }
        Ok(Self::with_capacity_unchecked(block_capacity))
    }

    fn with_capacity_unchecked(block_capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity,
            free_head: None,
            len: 0,
        }
    }

    fn index_space() -> usize {
        u32::MAX as usize + 1
    }

    /// Store `value` in a free slot and return its handle
    pub fn allocate(&mut self, value: T) -> SlotHandle {
        if let Some(index) = self.free_head {
            let (block, offset) = self.locate(index);
            let slot = &mut self.blocks[block][offset];
            let next_free = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => engine_fatal!(SOURCE, "Free list points at live slot {}", index),
            };
            *slot = Slot::Occupied(value);
            self.free_head = next_free;
            self.len += 1;
            return SlotHandle(index);
        }

        let needs_block = self.blocks.last()
            .map_or(true, |block| block.len() == self.block_capacity);
        if needs_block {
            self.allocate_block();
        }

        let block_index = self.blocks.len() - 1;
        let block = &mut self.blocks[block_index];
        let index = block_index * self.block_capacity + block.len();
        block.push(Slot::Occupied(value));
        self.len += 1;
        SlotHandle(index as u32)
    }

    /// Allocate a slot and initialize it in place with `init`
    pub fn allocate_with<F: FnOnce() -> T>(&mut self, init: F) -> SlotHandle {
        self.allocate(init())
    }

    /// Return the slot to the free list and hand back its element
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not issued by this pool or was already freed.
    pub fn deallocate(&mut self, handle: SlotHandle) -> T {
        let next_free = self.free_head;
        let slot = match self.slot_mut(handle) {
            Some(slot) => slot,
            None => engine_fatal!(SOURCE, "Slot {} was never issued by this pool", handle.0),
        };
        match mem::replace(slot, Slot::Vacant { next_free }) {
            Slot::Occupied(value) => {
                self.free_head = Some(handle.0);
                self.len -= 1;
                value
            }
            Slot::Vacant { next_free } => {
                *slot = Slot::Vacant { next_free };
                engine_fatal!(SOURCE, "Double free of slot {}", handle.0)
            }
        }
    }

    /// Get a live element
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        let (block, offset) = self.locate(handle.0);
        match self.blocks.get(block)?.get(offset)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Get a live element mutably
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        match self.slot_mut(handle)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Whether `handle` refers to a live element of this pool
    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no element is live
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots across all allocated blocks
    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.block_capacity
    }

    /// Number of allocated blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Slots per block
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Maximum number of elements this pool can ever hold
    ///
    /// Bounded by the `u32` handle space, rounded down to whole blocks.
    pub fn max_size(&self) -> usize {
        Self::index_space() / self.block_capacity * self.block_capacity
    }

    fn locate(&self, index: u32) -> (usize, usize) {
        let index = index as usize;
        (index / self.block_capacity, index % self.block_capacity)
    }

    fn slot_mut(&mut self, handle: SlotHandle) -> Option<&mut Slot<T>> {
        let (block, offset) = self.locate(handle.0);
        self.blocks.get_mut(block)?.get_mut(offset)
    }

    fn allocate_block(&mut self) {
        if self.capacity() + self.block_capacity > self.max_size() {
            engine_fatal!(SOURCE, "Slot pool exhausted its {} addressable slots", self.max_size());
        }
        self.blocks.push(Vec::with_capacity(self.block_capacity));
        engine_trace!(SOURCE, "Allocated block #{} ({} slots of {} bytes)",
            self.blocks.len() - 1, self.block_capacity, mem::size_of::<Slot<T>>());
    }
}

impl<T: Default> SlotPool<T> {
    /// Allocate a slot holding `T::default()`
    pub fn allocate_default(&mut self) -> SlotHandle {
        self.allocate_with(T::default)
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<SlotHandle> for SlotPool<T> {
    type Output = T;

    fn index(&self, handle: SlotHandle) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("invalid slot handle {}", handle.0),
        }
    }
}

impl<T> IndexMut<SlotHandle> for SlotPool<T> {
    fn index_mut(&mut self, handle: SlotHandle) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("invalid slot handle {}", handle.0),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_pool_tests.rs"]
mod tests;
