use common::{Bar, Result};

use crate::indicators::{max, mean};
use crate::{Strategy, StrategyParams};

const RECENT_DAYS: usize = 15;
const LOOKBACK_DAYS: usize = 60;
const MIN_BARS: usize = 30;

fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Up day on volume far above the last fifteen sessions, after an earlier
/// volume spike in the sixty-day lookback.
///
/// - `pct_change[t] > 0`
/// - `volume[t] > multiple * max(volume[t-15..=t-1])`
/// - `max(volume[t-60..=t-16]) > multiple * mean(volume[t-60..=t-16])`
#[derive(Debug, Clone)]
pub struct HighVolumeBreakout {
    multiple: f64,
}

impl HighVolumeBreakout {
    pub const NAME: &'static str = "High-volume breakout";

    pub fn new(multiple: f64) -> Self {
        Self { multiple }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(params.positive_f64("multiple", 3.0)?))
    }
}

impl Default for HighVolumeBreakout {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl Strategy for HighVolumeBreakout {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.len() < MIN_BARS {
            return false;
        }
        let t = history.len() - 1;
        let today = &history[t];

        if !today.pct_change.is_some_and(|p| p > 0.0) {
            return false;
        }

        let recent = volumes(&history[t - RECENT_DAYS..t]);
        let Some(recent_max) = max(&recent) else {
            return false;
        };
        if today.volume <= recent_max * self.multiple {
            return false;
        }

        let past = volumes(&history[t.saturating_sub(LOOKBACK_DAYS)..t - RECENT_DAYS]);
        match (max(&past), mean(&past)) {
            (Some(past_max), Some(past_mean)) => past_max > past_mean * self.multiple,
            _ => false,
        }
    }
}

/// Today's volume against the mean of the previous fifteen sessions.
#[derive(Debug, Clone)]
pub struct TwoDayHighVolume {
    multiple: f64,
}

impl TwoDayHighVolume {
    pub const NAME: &'static str = "Two-day high volume";

    pub fn new(multiple: f64) -> Self {
        Self { multiple }
    }

    pub fn from_params(params: &StrategyParams<'_>) -> Result<Self> {
        Ok(Self::new(params.positive_f64("multiple", 3.0)?))
    }
}

impl Default for TwoDayHighVolume {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl Strategy for TwoDayHighVolume {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        if history.len() < MIN_BARS {
            return false;
        }
        let t = history.len() - 1;
        mean(&volumes(&history[t - RECENT_DAYS..t]))
            .map(|avg| history[t].volume > avg * self.multiple)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::flat;

    /// 40 bars at volume 100 with one early spike at index 5 and today's bar last.
    fn spiked(today_volume: f64, today_pct: f64, early_spike: f64) -> Vec<Bar> {
        let mut bars = flat(40, 10.0, 100.0);
        bars[5].volume = early_spike;
        bars[39].volume = today_volume;
        bars[39].pct_change = Some(today_pct);
        bars
    }

    #[test]
    fn high_volume_breakout_fires() {
        assert!(HighVolumeBreakout::default().check(&spiked(400.0, 2.0, 1_000.0)));
    }

    #[test]
    fn high_volume_breakout_needs_up_day() {
        assert!(!HighVolumeBreakout::default().check(&spiked(400.0, 0.0, 1_000.0)));
    }

    #[test]
    fn high_volume_breakout_needs_recent_volume_multiple() {
        assert!(!HighVolumeBreakout::default().check(&spiked(300.0, 2.0, 1_000.0)));
    }

    #[test]
    fn high_volume_breakout_needs_earlier_spike() {
        assert!(!HighVolumeBreakout::default().check(&spiked(400.0, 2.0, 100.0)));
    }

    #[test]
    fn recent_spike_blocks_breakout() {
        let mut bars = spiked(400.0, 2.0, 1_000.0);
        bars[30].volume = 200.0;
        assert!(!HighVolumeBreakout::default().check(&bars));
    }

    #[test]
    fn two_day_high_volume_uses_recent_mean() {
        let mut bars = flat(30, 10.0, 100.0);
        bars[29].volume = 301.0;
        assert!(TwoDayHighVolume::default().check(&bars));
        bars[29].volume = 300.0;
        assert!(!TwoDayHighVolume::default().check(&bars));
    }
}
