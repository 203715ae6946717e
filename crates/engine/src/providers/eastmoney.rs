use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use common::{parse_day, parse_number, Bar, DataProvider, HistorySeries, MarketCode, Result};

use super::{get_text, http_client};

const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
const FIELDS1: &str = "f1,f2,f3,f4,f5,f6";
const FIELDS2: &str = "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61";
const UT: &str = "7eea3edcaed734bea9cbfc24409ed989";

/// Column positions inside one comma-separated kline record.
mod col {
    pub const DATE: usize = 0;
    pub const OPEN: usize = 1;
    pub const CLOSE: usize = 2;
    pub const HIGH: usize = 3;
    pub const LOW: usize = 4;
    pub const VOLUME: usize = 5;
    pub const AMOUNT: usize = 6;
    pub const PCT_CHANGE: usize = 8;
}

/// Unadjusted daily bars from EastMoney's `push2his` kline API.
pub struct EastMoneyProvider {
    http: Client,
}

impl EastMoneyProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl DataProvider for EastMoneyProvider {
    fn name(&self) -> &str {
        "eastmoney"
    }

    async fn fetch(
        &self,
        code: &str,
        market: MarketCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistorySeries> {
        let secid = format!("{}.{code}", market.eastmoney_id());
        let query = [
            ("fields1", FIELDS1.to_string()),
            ("fields2", FIELDS2.to_string()),
            ("ut", UT.to_string()),
            ("klt", "101".to_string()),
            ("fqt", "0".to_string()),
            ("secid", secid.clone()),
            ("beg", start.format("%Y%m%d").to_string()),
            ("end", end.format("%Y%m%d").to_string()),
        ];

        let started = Instant::now();
        let body = get_text(&self.http, KLINE_URL, &query).await?;
        let series = parse_payload(&body, start, end)?;
        debug!(
            provider = "eastmoney",
            %secid,
            bars = series.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched daily bars"
        );
        Ok(series)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Option<Vec<String>>,
}

/// Decode a kline response. `data: null` or an empty `klines` list is an
/// empty series; the upstream sends that for suspended or unknown codes.
pub fn parse_payload(body: &str, start: NaiveDate, end: NaiveDate) -> Result<HistorySeries> {
    let resp: KlineResponse = serde_json::from_str(body)?;
    let klines = resp.data.and_then(|d| d.klines).unwrap_or_default();

    let mut bars = Vec::with_capacity(klines.len());
    for line in &klines {
        let fields: Vec<&str> = line.split(',').collect();
        let Some(date) = fields.get(col::DATE).copied().and_then(parse_day) else {
            warn!(line = %line, "Skipping kline record with unreadable date");
            continue;
        };
        let num = |i: usize| fields.get(i).map_or(f64::NAN, |t| parse_number(t));

        let mut bar = Bar::new(
            date,
            num(col::OPEN),
            num(col::CLOSE),
            num(col::HIGH),
            num(col::LOW),
            num(col::VOLUME),
        );
        if fields.len() > col::AMOUNT {
            bar = bar.with_amount(num(col::AMOUNT));
        }
        if fields.len() > col::PCT_CHANGE {
            bar = bar.with_pct_change(num(col::PCT_CHANGE));
        }
        bars.push(bar);
    }

    Ok(HistorySeries::normalize(bars, start, end).with_derived_pct_change())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorKind;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    const BODY: &str = r#"{"rc":0,"rt":17,"data":{"code":"600000","market":1,"name":"PF Bank","klines":[
        "2025-06-03,10.00,10.20,10.30,9.95,150000,152000000.00,3.50,2.00,0.20,0.51",
        "2025-06-04,10.20,10.10,10.25,10.05,90000,91000000.00,1.96,-0.98,-0.10,0.31",
        "2025-06-05,10.10,-,10.40,10.00,110000"
    ]}}"#;

    #[test]
    fn parses_records_with_provider_pct_change() {
        let series = parse_payload(BODY, day("20250601"), day("20250630")).unwrap();
        assert_eq!(series.len(), 3);
        let first = &series.bars()[0];
        assert_eq!(first.close, 10.20);
        assert_eq!(first.volume, 150000.0);
        assert_eq!(first.amount, Some(152000000.0));
        assert_eq!(first.pct_change, Some(2.00));
        assert_eq!(series.bars()[1].pct_change, Some(-0.98));
    }

    #[test]
    fn short_record_gets_nan_and_derived_fields() {
        let series = parse_payload(BODY, day("20250601"), day("20250630")).unwrap();
        let last = &series.bars()[2];
        assert!(last.close.is_nan());
        assert_eq!(last.amount, None);
        // derived from a NaN close
        assert!(last.pct_change.unwrap().is_nan());
    }

    #[test]
    fn null_data_is_empty() {
        let body = r#"{"rc":102,"data":null}"#;
        assert!(parse_payload(body, day("20250601"), day("20250630")).unwrap().is_empty());
    }

    #[test]
    fn empty_klines_is_empty() {
        let body = r#"{"rc":0,"data":{"code":"000001","klines":[]}}"#;
        assert!(parse_payload(body, day("20250601"), day("20250630")).unwrap().is_empty());
    }

    #[test]
    fn non_json_body_is_parse_error() {
        let err = parse_payload("Service Unavailable", day("20250601"), day("20250630")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
