pub mod config;
pub mod indicators;
pub mod patterns;
pub mod registry;

pub use config::StrategyParams;
pub use registry::{StrategyRegistry, KNOWN_STRATEGIES};

use common::{Bar, StrategyMatch, Symbol};

/// All pattern predicates must satisfy this trait.
///
/// Implementations are pure: the same slice always gives the same answer, and
/// only bars inside the slice are looked at. The last bar of the slice is the
/// evaluation day.
pub trait Strategy: Send + Sync {
    /// Human-readable name reported on matches.
    fn name(&self) -> &str;

    /// Whether the pattern holds on the last bar of `history`.
    fn check(&self, history: &[Bar]) -> bool;

    /// Build a match record snapshotting the last bar, or `None` if `check` fails.
    fn summarize(&self, history: &[Bar], symbol: &Symbol) -> Option<StrategyMatch> {
        let today = history.last()?;
        if !self.check(history) {
            return None;
        }
        Some(StrategyMatch {
            symbol_code: symbol.code.clone(),
            symbol_name: symbol.display_name.clone(),
            strategy_name: self.name().to_string(),
            target_date: today.date,
            snapshot_price: today.close,
            snapshot_volume: today.volume,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, NaiveDate};
    use common::Bar;

    pub fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
    }

    /// Flat bars at `close` with constant `volume`.
    pub fn flat(n: usize, close: f64, volume: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar::new(day(i as i64), close, close, close, close, volume).with_pct_change(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::flat;

    struct Always(bool);

    impl Strategy for Always {
        fn name(&self) -> &str {
            "always"
        }

        fn check(&self, _history: &[Bar]) -> bool {
            self.0
        }
    }

    #[test]
    fn summarize_snapshots_last_bar() {
        let mut bars = flat(3, 10.0, 100.0);
        bars[2].close = 12.5;
        bars[2].volume = 900.0;
        let symbol = Symbol::new("600000", "PF Bank");

        let m = Always(true).summarize(&bars, &symbol).unwrap();
        assert_eq!(m.symbol_code, "600000");
        assert_eq!(m.symbol_name, "PF Bank");
        assert_eq!(m.strategy_name, "always");
        assert_eq!(m.target_date, bars[2].date);
        assert_eq!(m.snapshot_price, 12.5);
        assert_eq!(m.snapshot_volume, 900.0);
    }

    #[test]
    fn summarize_is_none_when_check_fails_or_history_empty() {
        let symbol = Symbol::new("000001", "Ping An");
        assert!(Always(false).summarize(&flat(3, 1.0, 1.0), &symbol).is_none());
        assert!(Always(true).summarize(&[], &symbol).is_none());
    }
}
