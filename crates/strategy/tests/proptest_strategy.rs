use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use common::{Bar, HistorySeries};
use strategy::patterns::{
    ContinuationGap, ContinuousRise, HighVolumeBreakout, LongLowerShadowRebound, MaBreakout,
    PriceIncrease, ThreeRisingPattern, ThreeSmallRise, TwoDayHighVolume, TwoDayUp,
};
use strategy::Strategy as Pattern;

fn all_strategies() -> Vec<Box<dyn Pattern>> {
    vec![
        Box::new(MaBreakout::new(20)),
        Box::new(MaBreakout::default()),
        Box::new(ContinuationGap::default()),
        Box::new(ContinuousRise::default()),
        Box::new(ThreeRisingPattern),
        Box::new(HighVolumeBreakout::default()),
        Box::new(TwoDayHighVolume::default()),
        Box::new(TwoDayUp::default()),
        Box::new(ThreeSmallRise::default()),
        Box::new(PriceIncrease::default()),
        Box::new(LongLowerShadowRebound::default()),
    ]
}

/// Prices may be zero or NaN to exercise degenerate divisions.
fn price() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => 0.01f64..1_000.0f64,
        1 => Just(0.0),
        1 => Just(f64::NAN),
    ]
}

fn bar_strategy() -> impl Strategy<Value = (f64, f64, f64, f64, f64, Option<f64>)> {
    (
        price(),
        price(),
        price(),
        price(),
        0.0f64..1_000_000.0f64,
        proptest::option::of(-20.0f64..20.0f64),
    )
}

fn build(raw: Vec<(f64, f64, f64, f64, f64, Option<f64>)>) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    raw.into_iter()
        .enumerate()
        .map(|(i, (open, close, high, low, volume, pct))| {
            let mut bar = Bar::new(start + Duration::days(i as i64), open, close, high, low, volume);
            bar.pct_change = pct;
            bar
        })
        .collect()
}

proptest! {
    /// Every predicate gives the same answer twice on the same slice and never panics.
    #[test]
    fn checks_are_deterministic(raw in proptest::collection::vec(bar_strategy(), 0..130)) {
        let bars = build(raw);
        for s in all_strategies() {
            let first = Pattern::check(s.as_ref(), &bars);
            let second = Pattern::check(s.as_ref(), &bars);
            prop_assert_eq!(first, second, "{} not deterministic", Pattern::name(s.as_ref()));
        }
    }

    /// The verdict on the last bar of a history is the same whether it is
    /// computed on that history alone or on a longer, unordered download
    /// normalized and cut back to the same day.
    #[test]
    fn later_bars_do_not_change_verdict_after_normalize_and_prefix(
        raw in proptest::collection::vec(bar_strategy(), 1..80),
        extra in proptest::collection::vec(bar_strategy(), 1..10),
    ) {
        let base = build(raw.clone());
        let mut all = raw;
        all.extend(extra);
        let mut download = build(all);
        download.reverse();
        let (start, end) = (download.last().unwrap().date, download[0].date);

        let series = HistorySeries::normalize(download, start, end);
        let cut = series.prefix(base.len() - 1);
        prop_assert_eq!(cut.len(), base.len());
        prop_assert_eq!(cut.last().map(|b| b.date), base.last().map(|b| b.date));
        for s in all_strategies() {
            prop_assert_eq!(
                Pattern::check(s.as_ref(), &base),
                Pattern::check(s.as_ref(), cut),
                "{} saw bars after the evaluation day",
                Pattern::name(s.as_ref())
            );
        }
    }
}
