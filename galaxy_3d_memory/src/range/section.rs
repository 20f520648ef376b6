use std::ops::Range;

/// Contiguous run of element indices.
///
/// Returned by `RangeAllocator::allocate` / `RangeTracker::allocate` and
/// handed back to the matching `deallocate`. Also used to describe the
/// free ranges kept by those allocators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Section {
    /// First index of the run
    pub index: u32,
    /// Number of elements in the run
    pub count: u32,
}

impl Section {
    /// Canonical empty section, returned by `allocate(0)`
    pub const EMPTY: Section = Section { index: 0, count: 0 };

    pub fn new(index: u32, count: u32) -> Self {
        Self { index, count }
    }

    /// One past the last index, widened so it never overflows
    pub fn end(&self) -> u64 {
        self.index as u64 + self.count as u64
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index range usable to slice backing storage
    pub fn range(&self) -> Range<usize> {
        self.index as usize..self.end() as usize
    }

    /// Whether `other` starts exactly where this section ends
    pub fn is_followed_by(&self, other: &Section) -> bool {
        self.end() == other.index as u64
    }
}
