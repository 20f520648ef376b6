//! Texture atlas allocation
//!
//! `AtlasAllocator` packs square power-of-two regions into a fixed atlas,
//! `NamedAtlas` keys those regions by name.

pub mod chunklet;
pub mod atlas_allocator;
pub mod named_atlas;

pub use chunklet::Chunklet;
pub use atlas_allocator::{AtlasAllocator, AtlasDesc};
pub use named_atlas::NamedAtlas;
