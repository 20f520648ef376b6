pub mod rolling_average;

pub use rolling_average::{RollingAverage, Sample};
