//! Fixed-window rolling average (frame times, allocation rates, ...)

use crate::error::Result;
use crate::engine_bail;

const SOURCE: &str = "galaxy3d::RollingAverage";

/// Numeric sample that can be averaged through `f64`
pub trait Sample: Copy + Default {
    fn to_f64(self) -> f64;
    /// Converts back with `as` semantics (truncation, saturation)
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                #[inline]
                fn to_f64(self) -> f64 { self as f64 }
                #[inline]
                fn from_f64(value: f64) -> Self { value as $ty }
            }
        )*
    };
}

impl_sample!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

/// Average of the last `window` samples
///
/// The window starts filled with zeros, so the average ramps up over the
/// first `window` updates.
pub struct RollingAverage<T: Sample> {
    values: Vec<T>,
    next: usize,
}

impl<T: Sample> RollingAverage<T> {
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `window` is zero.
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            engine_bail!(SOURCE, "Window must be non-zero");
        }
        Ok(Self {
            values: vec![T::default(); window],
            next: 0,
        })
    }

    /// Overwrite the oldest sample
    pub fn update(&mut self, value: T) {
        self.values[self.next] = value;
        self.next = (self.next + 1) % self.values.len();
    }

    pub fn current_average(&self) -> T {
        let sum: f64 = self.values.iter().map(|value| value.to_f64()).sum();
        T::from_f64(sum / self.values.len() as f64)
    }

    pub fn window(&self) -> usize {
        self.values.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "rolling_average_tests.rs"]
mod tests;
