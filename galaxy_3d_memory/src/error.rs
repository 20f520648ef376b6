//! Error types for the Galaxy3D memory allocators
//!
//! Only recoverable conditions live here: bad construction parameters and
//! name lookups in the atlas registry. Exhausting a fixed-capacity allocator
//! or asking the atlas for an oversized region is fatal and goes through
//! `engine_fatal!` instead.

use std::fmt;

/// Result type for Galaxy3D memory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D memory errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction parameters rejected (zero capacity, non power-of-two size, ...)
    InvalidConfig(String),

    /// Named entry does not exist
    NotFound(String),

    /// Named entry is already registered
    AlreadyExists(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR and build an `Error::InvalidConfig` with the same message
///
/// # Example
///
/// ```ignore
/// return Err(engine_err!("galaxy3d::RangeTracker", "Capacity must be non-zero"));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::InvalidConfig(message)
    }};
}

/// Log an ERROR and return early with an `Error::InvalidConfig`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
