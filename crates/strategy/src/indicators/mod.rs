pub mod moving_average;
pub mod volume;

pub use moving_average::trailing_mean;
pub use volume::{max, mean};
