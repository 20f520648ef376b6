//! Index-range allocation
//!
//! - `RangeAllocator<T>`: owns a growable backing array and hands out
//!   sections of it
//! - `RangeTracker`: same free list over an external, fixed index space

mod free_range_list;
pub mod section;
pub mod range_allocator;
pub mod range_tracker;

pub use section::Section;
pub use range_allocator::RangeAllocator;
pub use range_tracker::RangeTracker;
