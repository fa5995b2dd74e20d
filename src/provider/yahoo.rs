use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::FetchError;

use super::QuoteProvider;

pub const ENDPOINT: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Lookback window and bar size of the intraday request. Five days keep the
/// last session in range over weekends.
const RANGE: &str = "5d";
const INTERVAL: &str = "1m";
/// A latest bar older than the lookback window is stale.
const LOOKBACK_SECS: i64 = 5 * 24 * 60 * 60;

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize, Debug)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<IndicatorQuote>,
}

#[derive(Deserialize, Debug)]
struct IndicatorQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Most recent non-null close of the series, if it falls within the
    /// lookback window ending at `now` (unix seconds).
    fn latest_close(self, symbol: &str, now: i64) -> Result<Decimal, FetchError> {
        if let Some(error) = self.chart.error {
            return Err(FetchError::Provider {
                symbol: symbol.to_string(),
                description: format!("{} ({})", error.description, error.code),
            });
        }
        let result = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| FetchError::MissingField {
                symbol: symbol.to_string(),
                field: "result",
            })?;
        let quote = result
            .indicators
            .and_then(|indicators| indicators.quote.into_iter().next())
            .ok_or_else(|| FetchError::MissingField {
                symbol: symbol.to_string(),
                field: "indicators.quote",
            })?;
        let (index, close) = quote
            .close
            .into_iter()
            .enumerate()
            .rev()
            .find_map(|(index, close)| close.map(|close| (index, close)))
            .ok_or_else(|| FetchError::EmptySeries(symbol.to_string()))?;
        let observed = *result
            .timestamp
            .as_ref()
            .and_then(|timestamps| timestamps.get(index))
            .ok_or_else(|| FetchError::MissingField {
                symbol: symbol.to_string(),
                field: "timestamp",
            })?;
        let age_secs = now
            .checked_sub(observed)
            .ok_or_else(|| FetchError::InvalidPrice {
                symbol: symbol.to_string(),
                reason: "invalid timestamp".to_string(),
            })?;
        if age_secs > LOOKBACK_SECS {
            return Err(FetchError::Stale {
                symbol: symbol.to_string(),
                age_secs,
            });
        }
        Decimal::from_f64(close).ok_or_else(|| FetchError::InvalidPrice {
            symbol: symbol.to_string(),
            reason: format!("{close} is not representable"),
        })
    }
}

/// Reads the chart body before looking at the status, so a 404 carrying a
/// `chart.error` payload is reported as a provider error.
fn parse_chart(symbol: &str, status: StatusCode, body: &str, now: i64) -> Result<Decimal, FetchError> {
    match serde_json::from_str::<ChartResponse>(body) {
        Ok(response) if status.is_success() || response.chart.error.is_some() => {
            response.latest_close(symbol, now)
        }
        Ok(_) => Err(FetchError::Status {
            symbol: symbol.to_string(),
            status: status.as_u16(),
        }),
        Err(_) if !status.is_success() => Err(FetchError::Status {
            symbol: symbol.to_string(),
            status: status.as_u16(),
        }),
        Err(err) => Err(FetchError::Decode {
            symbol: symbol.to_string(),
            reason: err.to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: Client,
    endpoint: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_endpoint(ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, FetchError> {
        let params = [("range", RANGE), ("interval", INTERVAL)];
        Url::parse_with_params(
            format!("{}/v8/finance/chart/{}", self.endpoint, symbol).as_str(),
            &params,
        )
        .map_err(|err| FetchError::Provider {
            symbol: symbol.to_string(),
            description: format!("invalid url: {err}"),
        })
    }

    pub async fn get_latest_close(&self, symbol: &str) -> Result<Decimal, FetchError> {
        let url = self.chart_url(symbol)?;
        debug!("{}", url);
        let r = self.client.get(url).send().await?;
        let status = r.status();
        let body = r.text().await?;
        parse_chart(symbol, status, &body, Utc::now().timestamp())
    }
}

impl QuoteProvider for YahooProvider {
    async fn latest_closes(&self, symbols: &[&str]) -> Result<HashMap<String, Decimal>, FetchError> {
        let mut closes = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            let close = self.get_latest_close(symbol).await?;
            closes.insert(symbol.to_string(), close);
        }
        Ok(closes)
    }
}
