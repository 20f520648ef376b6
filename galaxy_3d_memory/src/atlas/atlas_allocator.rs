//! Two-level bin-packing allocator for square power-of-two atlas regions.
//!
//! The atlas (`atlas_size`²) is cut into a grid of `max_texture_size`²
//! chunks. The first time a chunk is used it is bound to one size class
//! (a power of two between `min_texture_size` and `max_texture_size`) and
//! split into `(max_texture_size / size)²` equal chunklets. A chunk only
//! returns to the free pool, and can be rebound to another class, once all
//! of its chunklets are free again.
//!
//! Allocate and free are O(1) apart from unlinking a fully freed chunk from
//! its size class' partial list.

use crate::error::Result;
use crate::{engine_bail, engine_fatal, engine_trace};
use super::chunklet::Chunklet;

const SOURCE: &str = "galaxy3d::AtlasAllocator";

// ===== ATLAS DESC =====

/// Atlas geometry; every size must be a power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasDesc {
    /// Side of the whole atlas, in pixels
    pub atlas_size: u16,
    /// Largest region that can be requested (also the chunk side)
    pub max_texture_size: u16,
    /// Smallest size class; smaller requests are rounded up to it
    pub min_texture_size: u16,
}

impl Default for AtlasDesc {
    fn default() -> Self {
        Self {
            atlas_size: 4096,
            max_texture_size: 1024,
            min_texture_size: 64,
        }
    }
}

// ===== INTERNAL STATE =====

struct Chunk {
    /// Free chunklet ids, popped from the back
    available: Vec<u16>,
}

struct SizeClassManager {
    size: u16,
    /// Chunks of this class with at least one free and one used chunklet,
    /// plus freshly claimed chunks
    partial_chunks: Vec<u16>,
}

// ===== ATLAS ALLOCATOR =====

pub struct AtlasAllocator {
    desc: AtlasDesc,
    chunks_per_row: u16,
    chunks: Vec<Chunk>,
    managers: Vec<SizeClassManager>,
    /// Size class index of each chunk; `None` while the chunk is free
    assignments: Vec<Option<u8>>,
    /// Unassigned chunks, popped from the back
    free_chunks: Vec<u16>,
}

impl AtlasAllocator {
    /// Create an empty atlas
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if a size is zero or not a power of
    /// two, if `min <= max <= atlas` does not hold, or if the atlas would
    /// need more than 65536 chunks or chunks more than 65536 chunklets.
    pub fn new(desc: AtlasDesc) -> Result<Self> {
        for (name, size) in [
            ("atlas_size", desc.atlas_size),
            ("max_texture_size", desc.max_texture_size),
            ("min_texture_size", desc.min_texture_size),
        ] {
            if !size.is_power_of_two() {
                engine_bail!(SOURCE, "{} must be a non-zero power of two (got {})", name, size);
            }
        }
        if desc.min_texture_size > desc.max_texture_size || desc.max_texture_size > desc.atlas_size {
            engine_bail!(SOURCE,
                "Sizes must satisfy min <= max <= atlas (got {} / {} / {})",
                desc.min_texture_size, desc.max_texture_size, desc.atlas_size);
        }

        // Chunk and chunklet ids are u16
        let chunks_per_row = desc.atlas_size / desc.max_texture_size;
        if chunks_per_row > 256 {
            engine_bail!(SOURCE,
                "Atlas of {} with chunks of {} needs more than 65536 chunks",
                desc.atlas_size, desc.max_texture_size);
        }
        if desc.max_texture_size / desc.min_texture_size > 256 {
            engine_bail!(SOURCE,
                "Chunks of {} split into {} regions exceed 65536 chunklets",
                desc.max_texture_size, desc.min_texture_size);
        }

        let chunk_count = chunks_per_row as usize * chunks_per_row as usize;
        let chunks = (0..chunk_count).map(|_| Chunk { available: Vec::new() }).collect();
        // Chunk 0 is handed out first
        let free_chunks = (0..chunk_count).rev().map(|id| id as u16).collect();

        let min_shift = desc.min_texture_size.trailing_zeros();
        let max_shift = desc.max_texture_size.trailing_zeros();
        let managers = (min_shift..=max_shift)
            .map(|shift| SizeClassManager {
                size: 1 << shift,
                partial_chunks: Vec::new(),
            })
            .collect();

        Ok(Self {
            desc,
            chunks_per_row,
            chunks,
            managers,
            assignments: vec![None; chunk_count],
            free_chunks,
        })
    }

    /// Reserve a square region that fits `width` x `height`
    ///
    /// The side is `max(width, height)` rounded up to a power of two and
    /// clamped up to `min_texture_size`.
    ///
    /// # Panics
    ///
    /// Panics if the rounded size exceeds `max_texture_size`, or if the
    /// size class has no room left and no free chunk remains.
    pub fn allocate(&mut self, width: u16, height: u16) -> Chunklet {
        let requested = u32::from(width.max(height)).next_power_of_two();
        if requested > u32::from(self.desc.max_texture_size) {
            engine_fatal!(SOURCE,
                "Texture atlas supports a maximum size of {} but was given {}x{}",
                self.desc.max_texture_size, width, height);
        }
        let size = (requested as u16).max(self.desc.min_texture_size);
        let class = self.class_index(size);

        let (chunk_id, chunklet_id) = loop {
            if let Some(ids) = self.take_chunklet(class) {
                break ids;
            }
            self.claim_free_chunk(class, width, height);
        };

        let (x, y) = self.chunklet_position(size, chunk_id, chunklet_id);
        Chunklet { chunk_id, chunklet_id, x, y, width, height, size }
    }

    /// Release a region obtained from `allocate`
    ///
    /// # Panics
    ///
    /// Panics if the chunklet does not belong to an assigned chunk of the
    /// matching size class. In debug builds a double free also panics.
    pub fn deallocate(&mut self, chunklet: Chunklet) {
        let chunk_index = chunklet.chunk_id as usize;
        let class = match self.assignments.get(chunk_index) {
            Some(Some(class)) => *class as usize,
            Some(None) => engine_fatal!(SOURCE,
                "Chunk {} is not allocated (double free?)", chunklet.chunk_id),
            None => engine_fatal!(SOURCE,
                "Chunk {} does not exist in this atlas", chunklet.chunk_id),
        };
        let size = self.managers[class].size;
        if chunklet.size != size {
            engine_fatal!(SOURCE,
                "Chunklet of size {} released into chunk {} of size class {}",
                chunklet.size, chunklet.chunk_id, size);
        }
        let total = self.chunklets_per_chunk(size);
        if chunklet.chunklet_id as u32 >= total {
            engine_fatal!(SOURCE,
                "Chunklet {} out of range for size class {} ({} per chunk)",
                chunklet.chunklet_id, size, total);
        }

        let chunk = &mut self.chunks[chunk_index];
        if cfg!(debug_assertions) && chunk.available.contains(&chunklet.chunklet_id) {
            engine_fatal!(SOURCE,
                "Double free of chunklet {} in chunk {}", chunklet.chunklet_id, chunklet.chunk_id);
        }
        chunk.available.push(chunklet.chunklet_id);
        let available = chunk.available.len() as u32;

        if available == total {
            chunk.available.clear();
            self.assignments[chunk_index] = None;
            let partial = &mut self.managers[class].partial_chunks;
            if let Some(position) = partial.iter().position(|&id| id == chunklet.chunk_id) {
                partial.remove(position);
            }
            self.free_chunks.push(chunklet.chunk_id);
            engine_trace!(SOURCE, "Chunk {} released from size class {}", chunklet.chunk_id, size);
        } else if available == 1 {
            // Was fully allocated
            self.managers[class].partial_chunks.push(chunklet.chunk_id);
        }
    }

    // ===== ACCESSORS =====

    /// Atlas geometry
    pub fn desc(&self) -> &AtlasDesc { &self.desc }

    /// Number of chunks along one side of the atlas
    pub fn chunks_per_row(&self) -> u16 { self.chunks_per_row }

    /// Total number of chunks
    pub fn chunk_count(&self) -> usize { self.chunks.len() }

    /// Number of unassigned chunks
    pub fn free_chunk_count(&self) -> usize { self.free_chunks.len() }

    /// Supported size classes, smallest first
    pub fn size_classes(&self) -> impl Iterator<Item = u16> + '_ {
        self.managers.iter().map(|manager| manager.size)
    }

    /// Number of chunklets a chunk bound to `size` is split into
    pub fn chunklets_per_chunk(&self, size: u16) -> u32 {
        let per_row = (self.desc.max_texture_size / size) as u32;
        per_row * per_row
    }

    /// Partially used chunks of a size class, `None` for unsupported sizes
    pub fn partial_chunks(&self, size: u16) -> Option<&[u16]> {
        self.managers.iter()
            .find(|manager| manager.size == size)
            .map(|manager| manager.partial_chunks.as_slice())
    }

    /// Size class a chunk is bound to, `None` while it is free
    pub fn chunk_size_class(&self, chunk_id: u16) -> Option<u16> {
        let class = (*self.assignments.get(chunk_id as usize)?)?;
        Some(self.managers[class as usize].size)
    }

    /// Free chunklets left in a bound chunk (0 for free or unknown chunks)
    pub fn available_chunklets(&self, chunk_id: u16) -> usize {
        self.chunks.get(chunk_id as usize).map_or(0, |chunk| chunk.available.len())
    }

    // ===== INTERNALS =====

    fn class_index(&self, size: u16) -> usize {
        (size.trailing_zeros() - self.desc.min_texture_size.trailing_zeros()) as usize
    }

    /// Pop a chunklet from the most recent partial chunk of `class`
    fn take_chunklet(&mut self, class: usize) -> Option<(u16, u16)> {
        let manager = &mut self.managers[class];
        let chunk_id = *manager.partial_chunks.last()?;
        let chunk = &mut self.chunks[chunk_id as usize];
        let chunklet_id = chunk.available.pop()?;
        if chunk.available.is_empty() {
            manager.partial_chunks.pop();
        }
        Some((chunk_id, chunklet_id))
    }

    /// Bind a free chunk to `class` and make it the class' partial chunk
    fn claim_free_chunk(&mut self, class: usize, width: u16, height: u16) {
        let chunk_id = match self.free_chunks.pop() {
            Some(chunk_id) => chunk_id,
            None => engine_fatal!(SOURCE,
                "Texture atlas has run out of free chunks (requested {}x{})", width, height),
        };
        let size = self.managers[class].size;
        let count = self.chunklets_per_chunk(size);

        let chunk = &mut self.chunks[chunk_id as usize];
        chunk.available.clear();
        chunk.available.reserve(count as usize);
        // Chunklet 0 ends up on top
        chunk.available.extend((0..count).rev().map(|id| id as u16));

        self.assignments[chunk_id as usize] = Some(class as u8);
        self.managers[class].partial_chunks.push(chunk_id);
        engine_trace!(SOURCE, "Chunk {} bound to size class {} ({} chunklets)", chunk_id, size, count);
    }

    fn chunklet_position(&self, size: u16, chunk_id: u16, chunklet_id: u16) -> (u16, u16) {
        let max = self.desc.max_texture_size as u32;
        let chunks_per_row = self.chunks_per_row as u32;
        let chunk_x = max * (chunk_id as u32 % chunks_per_row);
        let chunk_y = max * (chunk_id as u32 / chunks_per_row);

        let size = size as u32;
        let chunklets_per_row = max / size;
        let x = chunk_x + size * (chunklet_id as u32 % chunklets_per_row);
        let y = chunk_y + size * (chunklet_id as u32 / chunklets_per_row);
        (x as u16, y as u16)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "atlas_allocator_tests.rs"]
mod tests;
