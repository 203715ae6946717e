use common::{Bar, Result};

use crate::indicators::mean;
use crate::{Strategy, StrategyParams};

/// Unfilled gap-up on heavy volume.
///
/// Today opens at least `gap_ratio` above yesterday's close, never trades back
/// down to that close, and volume exceeds `volume_multiple` times the mean
/// volume of all earlier bars.
#[derive(Debug, Clone)]
pub struct ContinuationGap {
    gap_ratio: f64,
    volume_multiple: f64,
}

impl ContinuationGap {
    pub const NAME: &'static str = "Gap-up continuation";

    pub fn new(gap_ratio: f64, volume_multiple: f64) -> Self {
        Self {
            gap_ratio,
            volume_multiple,
        }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(
            params.positive_f64("gap_ratio", 0.20)?,
            params.positive_f64("volume_multiple", 2.0)?,
        ))
    }
}

impl Default for ContinuationGap {
    fn default() -> Self {
        Self::new(0.20, 2.0)
    }
}

impl Strategy for ContinuationGap {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        let [.., yesterday, today] = history else {
            return false;
        };

        let gap_ratio = (today.open - yesterday.close) / yesterday.close;
        let is_gap_up = gap_ratio >= self.gap_ratio;
        let not_filled = today.low > yesterday.close;

        let earlier: Vec<f64> = history[..history.len() - 1].iter().map(|b| b.volume).collect();
        let sufficient_volume = mean(&earlier)
            .map(|avg| today.volume > avg * self.volume_multiple)
            .unwrap_or(false);

        is_gap_up && not_filled && sufficient_volume
    }
}
