use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use common::{parse_day, Bar, DataProvider, Error, HistorySeries, MarketCode, Result};

use super::{get_text, http_client, json_number};

const KLINE_URL: &str = "https://proxy.finance.qq.com/ifzqgtimg/appstock/app/newfqkline/get";

/// Row arrays tried in order. Unadjusted first.
const SERIES_KEYS: [&str; 3] = ["day", "qfqday", "hfqday"];

/// Daily bars from Tencent's `newfqkline` endpoint.
///
/// The endpoint wraps its JSON in a `kline_day=` assignment and carries no
/// percent change, so that field is derived from consecutive closes.
pub struct TencentProvider {
    http: Client,
}

impl TencentProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl DataProvider for TencentProvider {
    fn name(&self) -> &str {
        "tencent"
    }

    async fn fetch(
        &self,
        code: &str,
        market: MarketCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistorySeries> {
        let symbol = format!("{}{code}", market.prefix());
        let span = (end - start).num_days().max(1);
        let query = [
            ("_var", "kline_day".to_string()),
            (
                "param",
                format!(
                    "{symbol},day,{},{},{span},",
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                ),
            ),
            ("r", format!("0.{}", fastrand::u32(..))),
        ];

        let started = Instant::now();
        let body = get_text(&self.http, KLINE_URL, &query).await?;
        let series = parse_payload(&body, &symbol, start, end)?;
        debug!(
            provider = "tencent",
            %symbol,
            bars = series.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched daily bars"
        );
        Ok(series)
    }
}

/// Decode a `kline_day={...}` body for `symbol` (e.g. "sh600000").
///
/// A missing symbol entry or row array means no trading data and yields an
/// empty series. A body that is not JSON at all is a parse error.
pub fn parse_payload(
    body: &str,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HistorySeries> {
    let json = match body.find("={") {
        Some(pos) => &body[pos + 1..],
        None if body.trim_start().starts_with('{') => body,
        None => {
            return Err(Error::Parse(format!(
                "unexpected tencent payload for {symbol}: no JSON object"
            )))
        }
    };
    let root: Value = serde_json::from_str(json.trim().trim_end_matches(';'))?;

    let Some(entry) = root.get("data").and_then(|d| d.get(symbol)) else {
        return Ok(HistorySeries::empty());
    };
    let Some(rows) = SERIES_KEYS.iter().find_map(|k| entry.get(*k)) else {
        return Ok(HistorySeries::empty());
    };
    let rows = rows
        .as_array()
        .ok_or_else(|| Error::Parse(format!("tencent rows for {symbol} are not an array")))?;

    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(cells) = row.as_array() else {
            warn!(%symbol, "Skipping non-array kline row");
            continue;
        };
        let Some(date) = cells.first().and_then(Value::as_str).and_then(parse_day) else {
            warn!(%symbol, row = %row, "Skipping kline row with unreadable date");
            continue;
        };
        bars.push(Bar::new(
            date,
            json_number(cells.get(1)),
            json_number(cells.get(2)),
            json_number(cells.get(3)),
            json_number(cells.get(4)),
            json_number(cells.get(5)),
        ));
    }

    Ok(HistorySeries::normalize(bars, start, end).with_derived_pct_change())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    const BODY: &str = r#"kline_day={"code":0,"msg":"","data":{"sh600000":{"day":[
        ["2025-06-04","10.10","10.30","10.40","10.00","120000.000"],
        ["2025-06-03","10.00","10.00","10.20","9.90","100000.000"],
        ["2025-06-05","10.30","x.xx","10.60","10.20","130000.000",{"nd":"2025"}]
    ]}}}"#;

    #[test]
    fn parses_and_orders_rows() {
        let series = parse_payload(BODY, "sh600000", day("20250601"), day("20250630")).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(day("20250603")));
        let second = &series.bars()[1];
        assert_eq!(second.open, 10.10);
        assert_eq!(second.close, 10.30);
        assert_eq!(second.high, 10.40);
        assert_eq!(second.low, 10.00);
        assert_eq!(second.volume, 120000.0);
        assert!((second.pct_change.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_numeric_field_becomes_nan() {
        let series = parse_payload(BODY, "sh600000", day("20250601"), day("20250630")).unwrap();
        let last = series.bars().last().unwrap();
        assert!(last.close.is_nan());
        assert_eq!(last.high, 10.60);
    }

    #[test]
    fn window_filters_rows() {
        let series = parse_payload(BODY, "sh600000", day("20250604"), day("20250604")).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].date, day("20250604"));
    }

    #[test]
    fn missing_symbol_is_empty() {
        let series = parse_payload(BODY, "sz000001", day("20250601"), day("20250630")).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn adjusted_rows_are_used_when_day_is_absent() {
        let body = r#"kline_day={"data":{"sz000001":{"qfqday":[["2025-06-03","1","2","3","0.5","10"]]}}}"#;
        let series = parse_payload(body, "sz000001", day("20250601"), day("20250630")).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].close, 2.0);
    }

    #[test]
    fn empty_data_array_is_empty() {
        let body = r#"kline_day={"code":0,"data":[]}"#;
        let series = parse_payload(body, "sh600000", day("20250601"), day("20250630")).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn unreadable_date_row_is_skipped() {
        let body = r#"kline_day={"data":{"sh600000":{"day":[["soon","1","2","3","0.5","10"],["2025-06-03","1","2","3","0.5","10"]]}}}"#;
        let series = parse_payload(body, "sh600000", day("20250601"), day("20250630")).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn garbage_body_is_parse_error() {
        let err = parse_payload("<html>busy</html>", "sh600000", day("20250601"), day("20250630"))
            .unwrap_err();
        assert!(err.is_retryable());
        let err = parse_payload("kline_day={\"data\":", "sh600000", day("20250601"), day("20250630"))
            .unwrap_err();
        assert_eq!(err.kind(), common::ErrorKind::Parse);
    }
}
