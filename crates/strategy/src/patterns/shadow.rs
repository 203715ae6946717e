use common::{Bar, Result};

use crate::{Strategy, StrategyParams};

/// Long lower shadow with a rebound off the low.
///
/// The lower shadow (`min(open, close) - low`) exceeds `shadow_multiple` times
/// the body, and the close sits more than `rebound` above the low.
#[derive(Debug, Clone)]
pub struct LongLowerShadowRebound {
    shadow_multiple: f64,
    rebound: f64,
}

impl LongLowerShadowRebound {
    pub const NAME: &'static str = "Long lower shadow rebound";

    pub fn new(shadow_multiple: f64, rebound: f64) -> Self {
        Self {
            shadow_multiple,
            rebound,
        }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(
            params.positive_f64("shadow_multiple", 3.0)?,
            params.positive_f64("rebound", 0.04)?,
        ))
    }
}

impl Default for LongLowerShadowRebound {
    fn default() -> Self {
        Self::new(3.0, 0.04)
    }
}

impl Strategy for LongLowerShadowRebound {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        let Some(today) = history.last() else {
            return false;
        };
        let lower_shadow = today.open.min(today.close) - today.low;
        let body = (today.close - today.open).abs();
        let rebound = (today.close - today.low) / today.low;

        lower_shadow > self.shadow_multiple * body && rebound > self.rebound
    }
}
