use common::{Bar, Result};

use crate::indicators::mean;
use crate::{Strategy, StrategyParams};

/// True when every bar has a percent change and it satisfies `pred`.
fn all_pct(bars: &[Bar], pred: impl Fn(f64) -> bool) -> bool {
    bars.iter().all(|b| b.pct_change.is_some_and(&pred))
}

/// Two consecutive limit-style rises confirmed by volume.
///
/// The last two bars both gain more than `threshold` percent and today's
/// volume is at least `volume_multiple` times the mean volume of the whole
/// slice, today included.
#[derive(Debug, Clone)]
pub struct ContinuousRise {
    threshold: f64,
    volume_multiple: f64,
    min_bars: usize,
}

impl ContinuousRise {
    pub const NAME: &'static str = "Continuous rise";

    pub fn new(threshold: f64, volume_multiple: f64) -> Self {
        Self {
            threshold,
            volume_multiple,
            min_bars: 30,
        }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        let mut strategy = Self::new(
            params.f64("threshold", 9.0)?,
            params.positive_f64("volume_multiple", 2.0)?,
        );
        strategy.min_bars = params.usize("min_bars", 30)?.max(2);
        Ok(strategy)
    }
}

impl Default for ContinuousRise {
    fn default() -> Self {
        Self::new(9.0, 2.0)
    }
}

impl Strategy for ContinuousRise {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.len() < self.min_bars {
            return false;
        }
        if !all_pct(&history[history.len() - 2..], |p| p > self.threshold) {
            return false;
        }

        let volumes: Vec<f64> = history.iter().map(|b| b.volume).collect();
        let Some(avg_volume) = mean(&volumes) else {
            return false;
        };
        let today = &history[history.len() - 1];
        today.volume >= avg_volume * self.volume_multiple
    }
}

/// Two strong up days measured against the lower of the prior close and today's open.
///
/// today: `(close[t] - min(close[t-1], open[t])) / close[t-1] * 100`
/// yesterday: `(close[t-1] - min(close[t-2], open[t])) / open[t-2] * 100`
/// Both must exceed `threshold`.
#[derive(Debug, Clone)]
pub struct TwoDayUp {
    threshold: f64,
}

impl TwoDayUp {
    pub const NAME: &'static str = "Two-day surge";

    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(params.f64("threshold", 9.0)?))
    }
}

impl Default for TwoDayUp {
    fn default() -> Self {
        Self::new(9.0)
    }
}

impl Strategy for TwoDayUp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.len() < 30 {
            return false;
        }
        let [.., two_ago, yesterday, today] = history else {
            return false;
        };

        let today_change =
            (today.close - yesterday.close.min(today.open)) / yesterday.close * 100.0;
        let yesterday_change =
            (yesterday.close - two_ago.close.min(today.open)) / two_ago.open * 100.0;

        today_change > self.threshold && yesterday_change > self.threshold
    }
}

/// Three consecutive small gains, each in `(0, max_rise)` percent.
#[derive(Debug, Clone)]
pub struct ThreeSmallRise {
    max_rise: f64,
}

impl ThreeSmallRise {
    pub const NAME: &'static str = "Three small rises";

    pub fn new(max_rise: f64) -> Self {
        Self { max_rise }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(params.positive_f64("max_rise", 3.0)?))
    }
}

impl Default for ThreeSmallRise {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl Strategy for ThreeSmallRise {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.len() < 3 {
            return false;
        }
        all_pct(&history[history.len() - 3..], |p| p > 0.0 && p < self.max_rise)
    }
}

/// Today gains more than `threshold` percent, and so did at least one of the
/// last `days` bars.
#[derive(Debug, Clone)]
pub struct PriceIncrease {
    threshold: f64,
    days: usize,
}

impl PriceIncrease {
    pub const NAME: &'static str = "Price increase";

    pub fn new(threshold: f64, days: usize) -> Self {
        Self { threshold, days }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(
            params.f64("threshold", 5.0)?,
            params.usize("days", 5)?,
        ))
    }
}

impl Default for PriceIncrease {
    fn default() -> Self {
        Self::new(5.0, 5)
    }
}

impl Strategy for PriceIncrease {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.is_empty() || history.len() < self.days {
            return false;
        }
        let latest = history[history.len() - 1].pct_change;
        let recent = &history[history.len() - self.days..];

        latest.is_some_and(|p| p > self.threshold)
            && recent
                .iter()
                .any(|b| b.pct_change.is_some_and(|p| p > self.threshold))
    }
}
