//! Slab pool for fixed-size elements
//!
//! Backs the node storage of the free-range lists in `crate::range`.

pub mod slot_pool;

pub use slot_pool::{SlotPool, SlotHandle, DEFAULT_BLOCK_BYTES};
