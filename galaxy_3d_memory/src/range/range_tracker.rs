//! Non-owning, fixed-capacity range tracker.
//!
//! Same first-fit / coalescing free list as `RangeAllocator`, but over an
//! abstract index space: nothing is stored here, and the space never grows.
//! Used to reserve ranges of something owned elsewhere (descriptor slots,
//! instance ids in a GPU buffer, ...).

use crate::error::Result;
use crate::{engine_bail, engine_fatal};
use super::free_range_list::FreeRangeList;
use super::section::Section;

const SOURCE: &str = "galaxy3d::RangeTracker";

pub struct RangeTracker {
    free_list: FreeRangeList,
}

impl RangeTracker {
    /// Track the whole `u32` index space
    pub fn new() -> Self {
        Self {
            free_list: FreeRangeList::new(u32::MAX, SOURCE),
        }
    }

    /// Track `[0, capacity)`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `capacity` is zero.
    pub fn with_capacity(capacity: u32) -> Result<Self> {
        if capacity == 0 {
            engine_bail!(SOURCE, "Capacity must be non-zero");
        }
        Ok(Self {
            free_list: FreeRangeList::new(capacity, SOURCE),
        })
    }

    /// Reserve `count` contiguous indices
    ///
    /// `count == 0` returns `Section::EMPTY` without touching any state.
    ///
    /// # Panics
    ///
    /// Panics if no free range can hold `count` indices. The capacity is a
    /// configuration constant, so running out is treated as unrecoverable.
    pub fn allocate(&mut self, count: u32) -> Section {
        if count == 0 {
            return Section::EMPTY;
        }
        match self.free_list.allocate(count) {
            Some(section) => section,
            None => engine_fatal!(SOURCE,
                "Range tracker has run out of sections to allocate (requested {}, {} of {} free)",
                count, self.free_list.free_count(), self.free_list.capacity()),
        }
    }

    /// Release a section obtained from `allocate`
    ///
    /// # Panics
    ///
    /// Panics if the section overlaps free space (double free) or lies
    /// outside the tracked capacity.
    pub fn deallocate(&mut self, section: Section) {
        self.free_list.deallocate(section);
    }

    /// Size of the tracked index space
    pub fn capacity(&self) -> u32 {
        self.free_list.capacity()
    }

    /// Number of free indices
    pub fn free_count(&self) -> u64 {
        self.free_list.free_count()
    }

    /// Free ranges in ascending index order
    pub fn free_ranges(&self) -> impl Iterator<Item = Section> + '_ {
        self.free_list.iter()
    }
}

impl Default for RangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "range_tracker_tests.rs"]
mod tests;
