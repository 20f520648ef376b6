/*!
# Galaxy 3D Memory

In-process allocators used by the Galaxy 3D engine's resource and render
layers.

## Architecture

- **SlotPool**: slab pool of fixed-size slots with O(1) allocate / free and
  stable handles
- **RangeAllocator**: growable backing array handed out as contiguous
  sections (first-fit, coalescing free list)
- **RangeTracker**: same free list over an external, fixed-size index space
- **AtlasAllocator**: packs square power-of-two regions into a fixed 2D atlas
  using size-class-locked chunks
- **NamedAtlas**: name-keyed registry over an `AtlasAllocator`

Allocators are single-owner: every mutation takes `&mut self` and nothing
locks internally. Only the global logger is shared.
*/

// Internal modules
mod error;
pub mod log;
pub mod pool;
pub mod range;
pub mod atlas;
pub mod utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types and logger control, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        pub use crate::log::{set_logger, reset_logger, set_min_severity, min_severity};
    }

    // Pool and range allocators
    pub mod memory {
        pub use crate::pool::*;
        pub use crate::range::*;
    }

    // Texture atlas allocation
    pub mod atlas {
        pub use crate::atlas::*;
    }

    // Small helpers
    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
