use common::Bar;

use crate::Strategy;

/// Three rising sessions in a row.
///
/// Over the last three bars: closes strictly increase, every session opens
/// below its own close, and volume strictly increases.
#[derive(Debug, Clone, Default)]
pub struct ThreeRisingPattern;

impl ThreeRisingPattern {
    pub const NAME: &'static str = "Three-day ascending pattern";
}

impl Strategy for ThreeRisingPattern {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, history: &[Bar]) -> bool {
        let [.., first, second, third] = history else {
            return false;
        };
        let days = [first, second, third];

        let closes_rising = days.windows(2).all(|w| w[1].close > w[0].close);
        let opens_below_close = days.iter().all(|b| b.open < b.close);
        let volumes_rising = days.windows(2).all(|w| w[1].volume > w[0].volume);

        closes_rising && opens_below_close && volumes_rising
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::day;

    fn bars(opens: [f64; 3], closes: [f64; 3], volumes: [f64; 3]) -> Vec<Bar> {
        (0..3)
            .map(|i| {
                Bar::new(
                    day(i as i64),
                    opens[i],
                    closes[i],
                    closes[i] + 0.5,
                    opens[i] - 0.5,
                    volumes[i],
                )
            })
            .collect()
    }

    #[test]
    fn fires_on_rising_closes_and_volumes() {
        let history = bars([9.0, 10.5, 11.5], [10.0, 11.0, 12.0], [100.0, 150.0, 200.0]);
        assert!(ThreeRisingPattern.check(&history));
    }

    #[test]
    fn middle_open_at_close_suppresses_match() {
        let history = bars([9.0, 11.0, 11.5], [10.0, 11.0, 12.0], [100.0, 150.0, 200.0]);
        assert!(!ThreeRisingPattern.check(&history));
    }

    #[test]
    fn falling_volume_suppresses_match() {
        let history = bars([9.0, 10.5, 11.5], [10.0, 11.0, 12.0], [100.0, 150.0, 120.0]);
        assert!(!ThreeRisingPattern.check(&history));
    }

    #[test]
    fn flat_close_suppresses_match() {
        let history = bars([9.0, 10.5, 10.5], [10.0, 11.0, 11.0], [100.0, 150.0, 200.0]);
        assert!(!ThreeRisingPattern.check(&history));
    }

    #[test]
    fn needs_three_bars() {
        let history = bars([9.0, 10.5, 11.5], [10.0, 11.0, 12.0], [100.0, 150.0, 200.0]);
        assert!(!ThreeRisingPattern.check(&history[1..]));
    }
}
