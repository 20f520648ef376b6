//! Sorted, fully coalesced list of free index ranges.
//!
//! Shared by `RangeAllocator` (owning, growable) and `RangeTracker`
//! (non-owning, fixed). Nodes are allocated from a `SlotPool` and linked
//! by `SlotHandle`, in strictly ascending index order. After every
//! operation no two listed ranges overlap or touch.

use crate::engine_fatal;
use crate::pool::{SlotHandle, SlotPool};
use super::section::Section;

struct RangeNode {
    range: Section,
    next: Option<SlotHandle>,
}

pub(crate) struct FreeRangeList {
    nodes: SlotPool<RangeNode>,
    head: Option<SlotHandle>,
    /// Size of the tracked index space
    capacity: u32,
    /// Source used in fatal misuse logs
    source: &'static str,
}

impl FreeRangeList {
    /// Single free range covering `[0, capacity)`
    pub(crate) fn new(capacity: u32, source: &'static str) -> Self {
        let mut nodes = SlotPool::new();
        let head = (capacity > 0).then(|| nodes.allocate(RangeNode {
            range: Section::new(0, capacity),
            next: None,
        }));
        Self { nodes, head, capacity, source }
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// First-fit: carve `count` indices from the front of the first range
    /// large enough. `None` when no range fits.
    pub(crate) fn allocate(&mut self, count: u32) -> Option<Section> {
        let mut previous: Option<SlotHandle> = None;
        let mut current = self.head;

        while let Some(handle) = current {
            let node = &mut self.nodes[handle];
            if node.range.count >= count {
                let section = Section::new(node.range.index, count);
                node.range.index += count;
                node.range.count -= count;
                if node.range.count == 0 {
                    let next = node.next;
                    self.unlink(previous, handle, next);
                }
                return Some(section);
            }
            previous = current;
            current = node.next;
        }
        None
    }

    /// Give `section` back, merging with the neighbouring free ranges
    ///
    /// # Panics
    ///
    /// Panics if `section` lies outside the tracked space or overlaps a
    /// range that is already free (double free).
    pub(crate) fn deallocate(&mut self, section: Section) {
        if section.is_empty() {
            return;
        }
        if section.end() > self.capacity as u64 {
            engine_fatal!(self.source,
                "Section [{}, {}) is outside the tracked capacity {}",
                section.index, section.end(), self.capacity);
        }

        // Find the first free range starting at or after the section
        let mut previous: Option<SlotHandle> = None;
        let mut current = self.head;
        while let Some(handle) = current {
            let node = &self.nodes[handle];
            if node.range.index >= section.index {
                break;
            }
            previous = current;
            current = node.next;
        }

        let overlaps_previous = previous
            .is_some_and(|handle| self.nodes[handle].range.end() > section.index as u64);
        let overlaps_next = current
            .is_some_and(|handle| section.end() > self.nodes[handle].range.index as u64);
        if overlaps_previous || overlaps_next {
            engine_fatal!(self.source,
                "Section [{}, {}) overlaps a free range (double free?)",
                section.index, section.end());
        }

        let merge_previous = previous
            .filter(|&handle| self.nodes[handle].range.is_followed_by(&section));
        let merge_next = current
            .filter(|&handle| section.is_followed_by(&self.nodes[handle].range));

        match (merge_previous, merge_next) {
            (Some(previous), Some(next)) => {
                let next_node = self.nodes.deallocate(next);
                let node = &mut self.nodes[previous];
                node.range.count += section.count + next_node.range.count;
                node.next = next_node.next;
            }
            (Some(previous), None) => {
                self.nodes[previous].range.count += section.count;
            }
            (None, Some(next)) => {
                let range = &mut self.nodes[next].range;
                range.index = section.index;
                range.count += section.count;
            }
            (None, None) => {
                let node = self.nodes.allocate(RangeNode { range: section, next: current });
                self.link_after(previous, node);
            }
        }
    }

    /// Extend the tracked space by `added` indices starting at the old capacity
    ///
    /// The new tail joins the last free range when that range ends at the
    /// old capacity; otherwise (including an empty list) it becomes a new node.
    pub(crate) fn grow(&mut self, added: u32) {
        let old_capacity = self.capacity;
        self.capacity = match old_capacity.checked_add(added) {
            Some(capacity) => capacity,
            None => engine_fatal!(self.source,
                "Growing by {} would exceed the u32 index space (capacity {})",
                added, old_capacity),
        };

        let mut last: Option<SlotHandle> = None;
        let mut current = self.head;
        while let Some(handle) = current {
            last = current;
            current = self.nodes[handle].next;
        }

        let tail = Section::new(old_capacity, added);
        match last.filter(|&handle| self.nodes[handle].range.is_followed_by(&tail)) {
            Some(handle) => self.nodes[handle].range.count += added,
            None => {
                let node = self.nodes.allocate(RangeNode { range: tail, next: None });
                self.link_after(last, node);
            }
        }
    }

    /// Free ranges in ascending index order
    pub(crate) fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        std::iter::successors(self.head, move |&handle| self.nodes[handle].next)
            .map(move |handle| self.nodes[handle].range)
    }

    /// Total number of free indices
    pub(crate) fn free_count(&self) -> u64 {
        self.iter().map(|range| range.count as u64).sum()
    }

    fn link_after(&mut self, previous: Option<SlotHandle>, node: SlotHandle) {
        match previous {
            Some(previous) => self.nodes[previous].next = Some(node),
            None => self.head = Some(node),
        }
    }

    fn unlink(&mut self, previous: Option<SlotHandle>, node: SlotHandle, next: Option<SlotHandle>) {
        match previous {
            Some(previous) => self.nodes[previous].next = next,
            None => self.head = next,
        }
        self.nodes.deallocate(node);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "free_range_list_tests.rs"]
mod tests;
