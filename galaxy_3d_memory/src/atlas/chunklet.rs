use glam::{UVec2, Vec4};

/// Square power-of-two region handed out by `AtlasAllocator`.
///
/// `x`/`y` are absolute atlas coordinates of the region's top-left corner.
/// `width`/`height` are the dimensions the caller asked for, `size` is the
/// size class actually reserved (`size >= max(width, height)`).
///
/// Plain value: valid from `allocate` until the matching `deallocate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunklet {
    /// Chunk the region belongs to (row-major over the atlas)
    pub chunk_id: u16,
    /// Index of the region inside its chunk (row-major)
    pub chunklet_id: u16,
    pub x: u16,
    pub y: u16,
    /// Requested width
    pub width: u16,
    /// Requested height
    pub height: u16,
    /// Reserved square size (power of two)
    pub size: u16,
}

impl Chunklet {
    /// Top-left corner in atlas pixels
    pub fn position(&self) -> UVec2 {
        UVec2::new(self.x as u32, self.y as u32)
    }

    /// Requested area in normalized atlas coordinates: `(u, v, width, height)`
    pub fn uv_rect(&self, atlas_size: u16) -> Vec4 {
        let atlas = atlas_size as f32;
        Vec4::new(
            self.x as f32 / atlas,
            self.y as f32 / atlas,
            self.width as f32 / atlas,
            self.height as f32 / atlas,
        )
    }
}
