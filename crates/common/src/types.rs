use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, ErrorKind, Result};

/// One entry of the screening universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub code: String,
    pub display_name: String,
}

impl Symbol {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.display_name, self.code)
    }
}

/// One trading day for one symbol.
///
/// Price and volume fields that could not be parsed upstream hold `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub amount: Option<f64>,
    /// Percent change against the previous close, e.g. `9.98` for +9.98%.
    pub pct_change: Option<f64>,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, close: f64, high: f64, low: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            close,
            high,
            low,
            volume,
            amount: None,
            pct_change: None,
        }
    }

    pub fn with_pct_change(mut self, pct_change: f64) -> Self {
        self.pct_change = Some(pct_change);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Daily bars of one symbol, strictly ascending by date with one bar per date.
///
/// Only constructible through [`HistorySeries::normalize`], so the ordering
/// invariant always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    bars: Vec<Bar>,
}

impl HistorySeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sort, drop repeated dates (first occurrence wins) and keep only
    /// `[start, end]`.
    pub fn normalize(mut bars: Vec<Bar>, start: NaiveDate, end: NaiveDate) -> Self {
        bars.retain(|b| b.date >= start && b.date <= end);
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    /// Fill missing percent changes from consecutive closes.
    /// The first bar has no previous close and keeps `None`.
    pub fn with_derived_pct_change(mut self) -> Self {
        for i in 1..self.bars.len() {
            if self.bars[i].pct_change.is_none() {
                let prev_close = self.bars[i - 1].close;
                let close = self.bars[i].close;
                self.bars[i].pct_change = Some((close - prev_close) / prev_close * 100.0);
            }
        }
        self
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// Bars `[0, index]` inclusive. Nothing dated after `bars[index]` is included.
    pub fn prefix(&self, index: usize) -> &[Bar] {
        let end = index.saturating_add(1).min(self.bars.len());
        &self.bars[..end]
    }
}

/// Inclusive date range requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::Config(format!(
                "fetch window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The last `check_days` trading days on or before `today`.
    pub fn from_calendar(calendar: &[NaiveDate], today: NaiveDate, check_days: usize) -> Result<Self> {
        let mut days: Vec<NaiveDate> = calendar.iter().copied().filter(|d| *d <= today).collect();
        days.sort();
        let tail = &days[days.len().saturating_sub(check_days)..];
        match (tail.first(), tail.last()) {
            (Some(&start), Some(&end)) if check_days > 0 => Ok(Self { start, end }),
            _ => Err(Error::Config(format!(
                "trading calendar has no dates on or before {today}"
            ))),
        }
    }

    /// Target dates used when the caller names none: the last day of the window.
    pub fn default_targets(&self) -> Vec<NaiveDate> {
        vec![self.end]
    }
}

/// A strategy that fired for one symbol on one target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMatch {
    pub symbol_code: String,
    pub symbol_name: String,
    pub strategy_name: String,
    pub target_date: NaiveDate,
    pub snapshot_price: f64,
    pub snapshot_volume: f64,
}

impl std::fmt::Display for StrategyMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}({}) [{}] close={:.2} volume={:.0}",
            self.target_date.format("%Y%m%d"),
            self.symbol_name,
            self.symbol_code,
            self.strategy_name,
            self.snapshot_price,
            self.snapshot_volume
        )
    }
}

/// Lifecycle of one symbol's fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    #[default]
    Pending,
    Running,
    Succeeded,
    /// The provider had no bars in range. Terminal, never retried.
    EmptyResult,
    FailedRetrying,
    FailedTerminal,
}

impl FetchState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FetchState::Succeeded | FetchState::EmptyResult | FetchState::FailedTerminal
        )
    }
}

impl std::fmt::Display for FetchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchState::Pending => write!(f, "pending"),
            FetchState::Running => write!(f, "running"),
            FetchState::Succeeded => write!(f, "succeeded"),
            FetchState::EmptyResult => write!(f, "empty"),
            FetchState::FailedRetrying => write!(f, "failed_retrying"),
            FetchState::FailedTerminal => write!(f, "failed_terminal"),
        }
    }
}

/// Per-symbol fetch bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchJob {
    pub symbol: Symbol,
    pub state: FetchState,
    /// Number of provider calls started so far.
    pub attempt: u32,
    pub last_error: Option<ErrorKind>,
}

impl FetchJob {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            state: FetchState::Pending,
            attempt: 0,
            last_error: None,
        }
    }

    /// Retries consumed: every call after the first one.
    pub fn retries(&self) -> u32 {
        self.attempt.saturating_sub(1)
    }
}

/// Best-effort numeric coercion. Anything unparsable becomes `NaN`.
pub fn parse_number(token: &str) -> f64 {
    token.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse a calendar day in `YYYYMMDD` or `YYYY-MM-DD` form.
pub fn parse_day(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    NaiveDate::parse_from_str(token, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(token, "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn bar(date: &str, close: f64) -> Bar {
        Bar::new(day(date), close, close, close, close, 100.0)
    }

    #[test]
    fn normalize_sorts_dedups_and_filters() {
        let bars = vec![
            bar("20250605", 3.0),
            bar("20250603", 1.0),
            bar("20250604", 2.0),
            bar("20250603", 9.0),
            bar("20250530", 0.5),
            bar("20250610", 7.0),
        ];
        let series = HistorySeries::normalize(bars, day("20250601"), day("20250607"));
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day("20250603"), day("20250604"), day("20250605")]);
        // first occurrence of a repeated date wins
        assert_eq!(series.bars()[0].close, 1.0);
    }

    #[test]
    fn derived_pct_change_leaves_first_bar_empty() {
        let series = HistorySeries::normalize(
            vec![bar("20250603", 10.0), bar("20250604", 11.0)],
            day("20250601"),
            day("20250630"),
        )
        .with_derived_pct_change();
        assert_eq!(series.bars()[0].pct_change, None);
        let pct = series.bars()[1].pct_change.unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn provider_pct_change_is_kept() {
        let series = HistorySeries::normalize(
            vec![bar("20250603", 10.0), bar("20250604", 11.0).with_pct_change(3.5)],
            day("20250601"),
            day("20250630"),
        )
        .with_derived_pct_change();
        assert_eq!(series.bars()[1].pct_change, Some(3.5));
    }

    #[test]
    fn prefix_ends_at_index() {
        let series = HistorySeries::normalize(
            vec![bar("20250603", 1.0), bar("20250604", 2.0), bar("20250605", 3.0)],
            day("20250601"),
            day("20250630"),
        );
        let prefix = series.prefix(1);
        assert_eq!(prefix.len(), 2);
        assert_eq!(prefix.last().unwrap().date, day("20250604"));
    }

    #[test]
    fn parse_number_coerces_garbage_to_nan() {
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert!(parse_number("--").is_nan());
        assert!(parse_number("").is_nan());
    }

    #[test]
    fn parse_day_accepts_both_formats() {
        assert_eq!(parse_day("20250630"), parse_day("2025-06-30"));
        assert!(parse_day("30/06/2025").is_none());
    }

    #[test]
    fn window_from_calendar_takes_last_days() {
        let calendar: Vec<_> = ["20250602", "20250603", "20250604", "20250605", "20250606"]
            .iter()
            .map(|d| day(d))
            .collect();
        let window = FetchWindow::from_calendar(&calendar, day("20250605"), 3).unwrap();
        assert_eq!(window.start, day("20250603"));
        assert_eq!(window.end, day("20250605"));
        assert_eq!(window.default_targets(), vec![day("20250605")]);
    }

    #[test]
    fn window_from_calendar_without_past_days_is_config_error() {
        let calendar = vec![day("20250610")];
        let err = FetchWindow::from_calendar(&calendar, day("20250605"), 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn reversed_window_is_rejected() {
        assert!(FetchWindow::new(day("20250610"), day("20250601")).is_err());
    }

    #[test]
    fn fetch_job_counts_retries_after_first_attempt() {
        let mut job = FetchJob::new(Symbol::new("600000", "PF Bank"));
        assert_eq!(job.retries(), 0);
        job.attempt = 3;
        assert_eq!(job.retries(), 2);
        assert!(!job.state.is_terminal());
    }
}
