//! Pure URL construction for the Polygon endpoints. No I/O, no hidden state:
//! identical inputs always produce identical strings.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Url;

use crate::models::Unit;

/// Format a date range as `YYYY-MM-DD/YYYY-MM-DD`. The caller guarantees
/// `start <= end`; a reversed range is passed through and left to the API.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}/{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

/// Format a timeframe as `{interval}/{unit}`, e.g. `1/minute`.
pub fn timeframe(interval: u32, unit: Unit) -> String {
    format!("{}/{}", interval, unit)
}

/// Compose the aggregates endpoint URL. Query params keep caller order,
/// values are percent-encoded, and `apiKey` always comes last.
pub fn candles_url(
    domain: &str,
    api_key: &str,
    symbol: &str,
    timeframe: &str,
    date_range: &str,
    params: &[(String, String)],
) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}v2/aggs/ticker/{}/range/{}/{}",
        domain, symbol, timeframe, date_range
    ))
    .context("Failed to build aggregates URL")?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
        query.append_pair("apiKey", api_key);
    }
    Ok(url)
}

/// Compose the reference-tickers listing URL with the API key appended.
pub fn symbols_url(domain: &str, api_key: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}v3/reference/tickers", domain))
        .context("Failed to build tickers URL")?;
    url.query_pairs_mut().append_pair("apiKey", api_key);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn timeframe_formats_interval_and_unit() {
        assert_eq!(timeframe(1, Unit::Minute), "1/minute");
        assert_eq!(timeframe(2, Unit::Hour), "2/hour");
        assert_eq!(timeframe(5, Unit::Day), "5/day");
    }

    #[test]
    fn date_range_formats_iso_dates() {
        assert_eq!(
            date_range(ymd(2024, 2, 2), ymd(2024, 2, 7)),
            "2024-02-02/2024-02-07"
        );
    }

    #[test]
    fn date_range_passes_reversed_ranges_through() {
        assert_eq!(
            date_range(ymd(2024, 2, 7), ymd(2024, 2, 2)),
            "2024-02-07/2024-02-02"
        );
    }

    #[test]
    fn candles_url_matches_reference_link() {
        let url = candles_url(
            "https://api.polygon.io/",
            "test-key",
            "AAPL",
            "1/day",
            "2023-01-01/2023-01-31",
            &[("adjusted".to_string(), "true".to_string())],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/day/2023-01-01/2023-01-31?adjusted=true&apiKey=test-key"
        );
    }

    #[test]
    fn candles_url_keeps_param_order_and_api_key_last() {
        let params = vec![
            ("adjusted".to_string(), "true".to_string()),
            ("sort".to_string(), "asc".to_string()),
            ("limit".to_string(), "50000".to_string()),
        ];
        let url = candles_url(
            "https://api.polygon.io/",
            "test-key",
            "AAPL",
            "1/minute",
            "2024-02-02/2024-02-07",
            &params,
        )
        .unwrap();
        assert_eq!(
            url.query().unwrap(),
            "adjusted=true&sort=asc&limit=50000&apiKey=test-key"
        );
    }

    #[test]
    fn candles_url_percent_encodes_param_values() {
        let params = vec![("note".to_string(), "a b&c".to_string())];
        let url = candles_url(
            "https://api.polygon.io/",
            "test-key",
            "AAPL",
            "1/day",
            "2023-01-01/2023-01-31",
            &params,
        )
        .unwrap();
        assert_eq!(url.query().unwrap(), "note=a+b%26c&apiKey=test-key");
    }

    #[test]
    fn symbols_url_appends_api_key() {
        let url = symbols_url("https://api.polygon.io/", "test-key").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.polygon.io/v3/reference/tickers?apiKey=test-key"
        );
    }

    #[test]
    fn builders_are_idempotent() {
        let build = || {
            candles_url(
                "https://api.polygon.io/",
                "test-key",
                "AAPL",
                "1/day",
                "2023-01-01/2023-01-31",
                &[("adjusted".to_string(), "true".to_string())],
            )
            .unwrap()
            .to_string()
        };
        assert_eq!(build(), build());
        assert_eq!(
            date_range(ymd(2024, 2, 2), ymd(2024, 2, 7)),
            date_range(ymd(2024, 2, 2), ymd(2024, 2, 7))
        );
        assert_eq!(timeframe(1, Unit::Minute), timeframe(1, Unit::Minute));
    }
}
