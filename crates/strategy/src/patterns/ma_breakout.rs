use common::{Bar, Result};

use crate::indicators::trailing_mean;
use crate::{Strategy, StrategyParams};

/// Close crosses above its trailing moving average on the last bar.
///
/// `close[t] > MA[t]` and `close[t-1] <= MA[t-1]`, which needs `window + 1` bars.
#[derive(Debug, Clone)]
pub struct MaBreakout {
    window: usize,
}

impl MaBreakout {
    pub const NAME: &'static str = "MA100 breakout";

    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(params.usize("window", 100)?))
    }
}

impl Default for MaBreakout {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Strategy for MaBreakout {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.len() < self.window + 1 {
            return false;
        }
        let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
        let t = closes.len() - 1;

        let (Some(ma_today), Some(ma_yesterday)) = (
            trailing_mean(&closes, t, self.window),
            trailing_mean(&closes, t - 1, self.window),
        ) else {
            return false;
        };

        closes[t] > ma_today && closes[t - 1] <= ma_yesterday
    }
}
