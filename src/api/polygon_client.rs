use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;

use crate::api::urls;
use crate::models::{AggsResponse, CandlesResult, TickerRecord, TickersResponse, Unit};

pub const POLYGON_DOMAIN: &str = "https://api.polygon.io/";

/// Upstream cap on aggregates results per request.
pub const DEFAULT_LIMIT: u32 = 50_000;

pub struct PolygonClient {
    client: Client,
    api_key: String,
    domain: String,
}

impl PolygonClient {
    pub fn new(api_key: String) -> Self {
        Self::with_domain(api_key, POLYGON_DOMAIN.to_string())
    }

    /// Point the client at a different base URL, e.g. a local stub server.
    pub fn with_domain(api_key: String, domain: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            domain,
        }
    }

    /// Fetch the first page of the reference-tickers listing. The upstream
    /// endpoint paginates; no cursor is followed here.
    pub async fn get_symbols(&self) -> Result<Vec<TickerRecord>> {
        let url = urls::symbols_url(&self.domain, &self.api_key)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send tickers request")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!("API request failed: {}", text);
        }

        let parsed: TickersResponse =
            serde_json::from_str(&text).context("Failed to parse tickers response")?;

        Ok(parsed.results.unwrap_or_default())
    }

    /// Fetch OHLCV candles for one symbol and date range. A single request,
    /// no pagination or retries; network and decode failures propagate.
    ///
    /// An unrecognized `unit` is reported as `CandlesResult::InvalidUnit`
    /// before any request is made.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_candles(
        &self,
        symbol: &str,
        interval: u32,
        unit: &str,
        start: NaiveDate,
        end: NaiveDate,
        limit: u32,
        extra: &[(String, String)],
    ) -> Result<CandlesResult> {
        let unit = match Unit::parse(unit) {
            Some(unit) => unit,
            None => return Ok(CandlesResult::InvalidUnit(unit.to_string())),
        };

        let mut params = extra.to_vec();
        params.push(("limit".to_string(), limit.to_string()));

        let url = urls::candles_url(
            &self.domain,
            &self.api_key,
            symbol,
            &urls::timeframe(interval, unit),
            &urls::date_range(start, end),
            &params,
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send aggregates request")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!("API request failed: {}", text);
        }

        let parsed: AggsResponse =
            serde_json::from_str(&text).context("Failed to parse aggregates response")?;

        Ok(CandlesResult::Candles(parsed.into_candles()))
    }
}
