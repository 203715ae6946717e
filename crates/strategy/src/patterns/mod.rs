//! Concrete pattern predicates.
//!
//! Each type reads only the slice it is given; the registry decides which
//! ones run.

pub mod ascending;
pub mod gap;
pub mod ma_breakout;
pub mod rise;
pub mod shadow;
pub mod volume;

pub use ascending::ThreeRisingPattern;
pub use gap::ContinuationGap;
pub use ma_breakout::MaBreakout;
pub use rise::{ContinuousRise, PriceIncrease, ThreeSmallRise, TwoDayUp};
pub use shadow::LongLowerShadowRebound;
pub use volume::{HighVolumeBreakout, TwoDayHighVolume};
