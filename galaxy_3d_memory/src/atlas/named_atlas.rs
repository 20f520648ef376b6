//! Name-keyed registry of atlas regions.
//!
//! Wraps an `AtlasAllocator` so callers can reserve, look up and release
//! regions by name (sprite or glyph identifiers) instead of carrying
//! `Chunklet` values around.

use glam::Vec4;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::engine_debug;
use super::atlas_allocator::{AtlasAllocator, AtlasDesc};
use super::chunklet::Chunklet;

const SOURCE: &str = "galaxy3d::NamedAtlas";

pub struct NamedAtlas {
    allocator: AtlasAllocator,
    regions: FxHashMap<String, Chunklet>,
}

impl NamedAtlas {
    /// Create an empty registry over a new atlas
    ///
    /// # Errors
    ///
    /// Same as `AtlasAllocator::new`.
    pub fn new(desc: AtlasDesc) -> Result<Self> {
        Ok(Self {
            allocator: AtlasAllocator::new(desc)?,
            regions: FxHashMap::default(),
        })
    }

    /// Reserve a region of `width` x `height` under `name`
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` if `name` is already registered. The
    /// atlas is left untouched in that case.
    ///
    /// # Panics
    ///
    /// Same fatal conditions as `AtlasAllocator::allocate`.
    pub fn insert(&mut self, name: &str, width: u16, height: u16) -> Result<Chunklet> {
        if self.regions.contains_key(name) {
            return Err(Error::AlreadyExists(format!(
                "Atlas region '{}' already exists", name
            )));
        }
        let chunklet = self.allocator.allocate(width, height);
        self.regions.insert(name.to_string(), chunklet);
        engine_debug!(SOURCE, "Region '{}' ({}x{}) placed at ({}, {})",
            name, width, height, chunklet.x, chunklet.y);
        Ok(chunklet)
    }

    /// Release the region registered under `name`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `name` is not registered.
    pub fn remove(&mut self, name: &str) -> Result<Chunklet> {
        let chunklet = self.regions.remove(name).ok_or_else(|| {
            Error::NotFound(format!("Atlas region '{}' not found", name))
        })?;
        self.allocator.deallocate(chunklet);
        Ok(chunklet)
    }

    pub fn get(&self, name: &str) -> Option<&Chunklet> {
        self.regions.get(name)
    }

    /// Normalized `(u, v, width, height)` of a region's requested area
    pub fn uv_rect(&self, name: &str) -> Option<Vec4> {
        let atlas_size = self.allocator.desc().atlas_size;
        self.regions.get(name).map(|chunklet| chunklet.uv_rect(atlas_size))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Registered names, in no particular order
    pub fn names(&self) -> Vec<&str> {
        self.regions.keys().map(|name| name.as_str()).collect()
    }

    /// Underlying allocator, for introspection
    pub fn allocator(&self) -> &AtlasAllocator {
        &self.allocator
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "named_atlas_tests.rs"]
mod tests;
