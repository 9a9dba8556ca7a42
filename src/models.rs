use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Bar-size unit accepted by the Polygon aggregates endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Day,
    Hour,
    Minute,
}

impl Unit {
    pub const ALL: [Unit; 3] = [Unit::Day, Unit::Hour, Unit::Minute];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
        }
    }

    pub fn parse(s: &str) -> Option<Unit> {
        Unit::ALL.iter().copied().find(|unit| unit.as_str() == s)
    }

    /// Comma-separated spellings for diagnostics.
    pub fn valid_units() -> String {
        Unit::ALL
            .iter()
            .map(|unit| unit.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OHLCV bar, column order fixed as (time, open, high, low, close, volume).
#[derive(Debug, Clone)]
pub struct Candle {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Outcome of a candle fetch: either a table or a rejected unit spelling.
/// The caller decides whether and how to report the rejection.
#[derive(Debug)]
pub enum CandlesResult {
    Candles(Vec<Candle>),
    InvalidUnit(String),
}

/// One entry of the aggregates `results` array, wire field names.
#[derive(Debug, Serialize, Deserialize)]
pub struct AggBar {
    pub t: i64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v: f64,
    // Add catch-all for other fields we don't care about
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AggsResponse {
    #[serde(default)]
    pub results: Option<Vec<AggBar>>,
    // Add catch-all for other fields we don't care about
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl AggsResponse {
    /// Project the `results` array into candles, preserving response order.
    /// A null or absent `results` field yields an empty table.
    pub fn into_candles(self) -> Vec<Candle> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .map(Candle::from)
            .collect()
    }
}

impl From<AggBar> for Candle {
    fn from(bar: AggBar) -> Self {
        // `t` is epoch milliseconds; out-of-range values fall back to the epoch
        let time = DateTime::from_timestamp_millis(bar.t)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default();
        Candle {
            time,
            open: bar.o,
            high: bar.h,
            low: bar.l,
            close: bar.c,
            volume: bar.v,
        }
    }
}

/// One entry of the reference-tickers `results` array. The shape is mostly
/// opaque to this client; everything beyond the common fields lands in `extra`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TickerRecord {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TickersResponse {
    #[serde(default)]
    pub results: Option<Vec<TickerRecord>>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
