use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{HistorySeries, MarketCode, Result};

/// Abstraction over an upstream daily-bar source.
///
/// `TencentProvider` and `EastMoneyProvider` in `crates/engine` implement this.
/// Everything downstream of the fetch only sees the canonical [`HistorySeries`],
/// so the active variant is purely a configuration choice.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs, e.g. "tencent".
    fn name(&self) -> &str;

    /// Fetch daily bars for `code` within `[start, end]`, inclusive.
    ///
    /// A range without trading data yields an empty series, not an error.
    /// Connectivity faults return `Error::TransientNetwork`, unusable payloads
    /// `Error::Parse`.
    async fn fetch(
        &self,
        code: &str,
        market: MarketCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistorySeries>;
}
