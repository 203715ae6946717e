use std::collections::BTreeMap;

use tracing::{debug, info};

use common::{Bar, Error, Result, StrategyMatch, StrategySettings, Symbol};

use crate::patterns::{
    ContinuationGap, ContinuousRise, HighVolumeBreakout, LongLowerShadowRebound, MaBreakout,
    PriceIncrease, ThreeRisingPattern, ThreeSmallRise, TwoDayHighVolume, TwoDayUp,
};
use crate::{Strategy, StrategyParams};

/// Configuration keys understood by [`StrategyRegistry::from_config`].
pub const KNOWN_STRATEGIES: &[&str] = &[
    "BreakM100",
    "ContinuationGapStrategy",
    "ContinuousRiseStrategy",
    "ThreeRisingPatternStrategy",
    "HighVolumeStrategy",
    "TwoDayHighVolumeStrategy",
    "TwoDayUpStrategy",
    "ThreeSmallRiseStrategy",
    "PriceIncreaseStrategy",
    "LongLowerShadowReboundStrategy",
];

/// The set of enabled strategies, immutable after construction.
///
/// Shared read-only across fetch workers behind an `Arc`.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Instantiate exactly the enabled strategies, in key order.
    ///
    /// Disabled entries are ignored even if their key is unknown; an enabled
    /// unknown key or a bad parameter is a configuration error.
    pub fn from_config(settings: &BTreeMap<String, StrategySettings>) -> Result<Self> {
        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();

        for (key, cfg) in settings {
            if !cfg.enabled {
                debug!(strategy = %key, "Strategy disabled");
                continue;
            }
            let strategy = build_strategy(key, &StrategyParams::new(key, &cfg.params))?;
            info!(key = %key, name = %strategy.name(), "Registered strategy");
            strategies.push(strategy);
        }

        Ok(Self { strategies })
    }

    /// Use pre-built strategies as-is.
    pub fn from_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Box<dyn Strategy>] {
        &self.strategies
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run every strategy against one history prefix. Matches follow registry order.
    pub fn evaluate(&self, history: &[Bar], symbol: &Symbol) -> Vec<StrategyMatch> {
        self.strategies
            .iter()
            .filter_map(|s| s.summarize(history, symbol))
            .collect()
    }
}

// ─── Strategy builders ────────────────────────────────────────────────────────

fn build_strategy(key: &str, params: &StrategyParams<'_>) -> Result<Box<dyn Strategy>> {
    let strategy: Box<dyn Strategy> = match key {
        "BreakM100" => Box::new(MaBreakout::from_params(params)?),
        "ContinuationGapStrategy" => Box::new(ContinuationGap::from_params(params)?),
        "ContinuousRiseStrategy" => Box::new(ContinuousRise::from_params(params)?),
        "ThreeRisingPatternStrategy" => Box::new(ThreeRisingPattern),
        "HighVolumeStrategy" => Box::new(HighVolumeBreakout::from_params(params)?),
        "TwoDayHighVolumeStrategy" => Box::new(TwoDayHighVolume::from_params(params)?),
        "TwoDayUpStrategy" => Box::new(TwoDayUp::from_params(params)?),
        "ThreeSmallRiseStrategy" => Box::new(ThreeSmallRise::from_params(params)?),
        "PriceIncreaseStrategy" => Box::new(PriceIncrease::from_params(params)?),
        "LongLowerShadowReboundStrategy" => Box::new(LongLowerShadowRebound::from_params(params)?),
        other => {
            return Err(Error::Config(format!(
                "unknown strategy '{other}', expected one of: {}",
                KNOWN_STRATEGIES.join(", ")
            )))
        }
    };
    Ok(strategy)
}
