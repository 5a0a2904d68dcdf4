//! Yahoo Finance data adapter.
//!
//! Fetches daily bars from Yahoo's v8 chart API with a blocking client. A
//! failed or empty fetch is reported immediately; there is no retry.

use crate::domain::error::BacktestError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, BacktestError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, BacktestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .map_err(|e| BacktestError::Io(std::io::Error::other(e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let midnight = |d: NaiveDate| {
            d.and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or_default()
        };
        let start_ts = midnight(start);
        // period2 is exclusive; ask for the day after `end`
        let end_ts = midnight(end.succ_opt().unwrap_or(end));
        format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, start_ts, end_ts
        )
    }
}

fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, BacktestError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) => {
            return Err(BacktestError::unavailable(
                symbol,
                format!("{}: {}", err.code, err.description),
            ));
        }
        (None, None) => {
            return Err(BacktestError::unavailable(symbol, "empty chart response"));
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| BacktestError::unavailable(symbol, "chart result is empty"))?;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| BacktestError::unavailable(symbol, "no quote data"))?;

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = chrono::DateTime::from_timestamp(ts, 0)?.date_naive();
            let open = quote.open.get(i).copied().flatten().unwrap_or(f64::NAN);
            let close = quote.close.get(i).copied().flatten().unwrap_or(f64::NAN);
            Some(PriceBar::new(date, open, close))
        })
        .collect();
    Ok(bars)
}

impl DataPort for YahooAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let url = self.chart_url(symbol, start, end);
        debug!(symbol, %url, "requesting Yahoo chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| BacktestError::unavailable(symbol, format!("request failed: {}", e)))?;

        let status = resp.status();
        let body: ChartResponse = resp.json().map_err(|e| {
            BacktestError::unavailable(symbol, format!("HTTP {}: undecodable response: {}", status, e))
        })?;

        parse_response(symbol, body)
    }
}
