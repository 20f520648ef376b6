//! Owning, growable range allocator.
//!
//! Holds a contiguous backing array of `T` and hands out `Section`s (index
//! ranges) into it, first-fit, with full coalescing on free. When no free
//! range can satisfy a request the backing array doubles (copying existing
//! elements index-for-index) and the search is retried, so allocation never
//! fails short of the `u32` index space.
//!
//! Sections stay valid across growth; slices borrowed from the backing
//! array do not, which the borrow checker enforces since `allocate` takes
//! `&mut self`.
//!
//! # Example
//!
//! ```ignore
//! let mut vertices = RangeAllocator::<[f32; 3]>::new(1024)?;
//! let mesh = vertices.allocate(36);
//! vertices.section_data_mut(mesh).copy_from_slice(&cube);
//! upload(vertices.underlying_bytes());
//! vertices.deallocate(mesh);
//! ```

use std::any;
use std::mem;
use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_fatal};
use super::free_range_list::FreeRangeList;
use super::section::Section;

const SOURCE: &str = "galaxy3d::RangeAllocator";

pub struct RangeAllocator<T> {
    free_list: FreeRangeList,
    data: Vec<T>,
}

impl<T: Clone + Default> RangeAllocator<T> {
    /// Create an allocator whose backing array holds `initial_count` elements
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `initial_count` is zero (doubling
    /// an empty array would never make room).
    pub fn new(initial_count: u32) -> Result<Self> {
        if initial_count == 0 {
            engine_bail!(SOURCE, "Initial element count must be non-zero");
        }
        Ok(Self {
            free_list: FreeRangeList::new(initial_count, SOURCE),
            data: vec![T::default(); initial_count as usize],
        })
    }

    /// Reserve `count` contiguous elements
    ///
    /// `count == 0` returns `Section::EMPTY` without touching any state.
    pub fn allocate(&mut self, count: u32) -> Section {
        if count == 0 {
            return Section::EMPTY;
        }
        loop {
            if let Some(section) = self.free_list.allocate(count) {
                return section;
            }
            self.grow();
        }
    }

    /// Double the backing array and publish the new tail as free space
    ///
    /// Near the top of the `u32` index space the growth is clamped so the
    /// element count ends at `u32::MAX`.
    ///
    /// # Panics
    ///
    /// Panics if the backing array already spans the whole index space.
    fn grow(&mut self) {
        let old_count = self.number_of_elements();
        let added = old_count.min(u32::MAX - old_count);
        if added == 0 {
            engine_fatal!(SOURCE,
                "Backing store of {} already spans the u32 index space ({} elements, {} free)",
                any::type_name::<T>(), old_count, self.free_list.free_count());
        }
        self.free_list.grow(added);

        let new_count = self.free_list.capacity() as usize;
        self.data.reserve_exact(new_count - self.data.len());
        self.data.resize(new_count, T::default());

        engine_debug!(SOURCE, "Grew backing store of {} from {} to {} elements ({} bytes)",
            any::type_name::<T>(), old_count, new_count, self.size_of_underlying_data());
    }
}

impl<T> RangeAllocator<T> {
    /// Size of a single element, in bytes
    pub const SIZE_OF_ELEMENT: usize = mem::size_of::<T>();

    /// Release a section obtained from `allocate`
    ///
    /// Empty sections are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the section overlaps free space (double free) or lies
    /// outside the backing array.
    pub fn deallocate(&mut self, section: Section) {
        self.free_list.deallocate(section);
    }

    /// Elements covered by `section`
    ///
    /// Do not hold on to the slice: the next `allocate` may move the data.
    pub fn section_data(&self, section: Section) -> &[T] {
        &self.data[section.range()]
    }

    /// Mutable elements covered by `section`
    pub fn section_data_mut(&mut self, section: Section) -> &mut [T] {
        &mut self.data[section.range()]
    }

    /// Whole backing array, including unallocated elements
    pub fn underlying_data(&self) -> &[T] {
        &self.data
    }

    /// Whole backing array, mutable
    pub fn underlying_data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Total size of the backing array, in bytes
    pub fn size_of_underlying_data(&self) -> usize {
        Self::SIZE_OF_ELEMENT * self.data.len()
    }

    /// Size of the data covered by `section`, in bytes
    pub fn size_of_section(&self, section: Section) -> usize {
        Self::SIZE_OF_ELEMENT * section.count as usize
    }

    /// Total number of elements, allocated or not
    pub fn number_of_elements(&self) -> u32 {
        self.free_list.capacity()
    }

    /// Name of the element type (diagnostics)
    pub fn element_type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    /// Number of free elements
    pub fn free_count(&self) -> u64 {
        self.free_list.free_count()
    }

    /// Free ranges in ascending index order
    pub fn free_ranges(&self) -> impl Iterator<Item = Section> + '_ {
        self.free_list.iter()
    }
}

impl<T: bytemuck::Pod> RangeAllocator<T> {
    /// Backing array as raw bytes, ready for a GPU buffer upload
    pub fn underlying_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Bytes covered by `section`
    pub fn section_bytes(&self, section: Section) -> &[u8] {
        bytemuck::cast_slice(self.section_data(section))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "range_allocator_tests.rs"]
mod tests;
