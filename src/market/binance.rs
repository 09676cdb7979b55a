use super::MarketDataError;
use crate::models::Candle;
use chrono::DateTime;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

const BINANCE_API_BASE: &str = "https://api.binance.com";
const RATE_LIMIT_RPM: u32 = 600; // Half of the public weight budget
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

type BinanceRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Convert `BTC/USDT` style symbols into Binance's `BTCUSDT`
pub fn to_exchange_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Binance spot REST client (public endpoints only)
///
/// Cloneable; all clones share the same rate limiter.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<BinanceRateLimiter>,
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

impl BinanceClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(BINANCE_API_BASE)
    }

    /// Client against a custom base URL (testnet, local mock)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let quota = Quota::per_minute(NonZeroU32::new(RATE_LIMIT_RPM).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a rate-limited GET request, retrying on 429, 5xx and network errors
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 1;

        loop {
            self.rate_limiter.until_ready().await;

            match self.client.get(&url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    let retryable =
                        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

                    if retryable && attempt < MAX_RETRIES {
                        let backoff_secs = 2u64.pow(attempt);
                        tracing::warn!(
                            "Binance returned {}, retrying in {}s (attempt {}/{})",
                            status,
                            backoff_secs,
                            attempt,
                            MAX_RETRIES
                        );
                        sleep(Duration::from_secs(backoff_secs)).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(MarketDataError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) if attempt < MAX_RETRIES => {
                    let backoff_secs = 2u64.pow(attempt);
                    tracing::warn!(
                        "Network error: {}, retrying in {}s (attempt {}/{})",
                        e,
                        backoff_secs,
                        attempt,
                        MAX_RETRIES
                    );
                    sleep(Duration::from_secs(backoff_secs)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Fetch the most recent candles, oldest first
    ///
    /// # Arguments
    /// * `symbol` - Exchange symbol, e.g. `BTCUSDT`
    /// * `interval` - Kline interval, e.g. `1h`, `15m`
    /// * `limit` - Number of candles (Binance caps this at 1000)
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];

        let rows: Vec<Vec<Value>> = self.get("/api/v3/klines", &query).await?.json().await?;

        let candles = rows
            .iter()
            .map(|row| parse_kline(row))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(symbol, interval, count = candles.len(), "Fetched candles");

        Ok(candles)
    }

    /// Fetch the last traded price
    pub async fn get_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let query = [("symbol", symbol.to_string())];

        let ticker: TickerPriceResponse =
            self.get("/api/v3/ticker/price", &query).await?.json().await?;

        parse_number(&ticker.price)
    }
}

/// Kline row layout: `[open_time, open, high, low, close, volume, close_time, ...]`
fn parse_kline(row: &[Value]) -> Result<Candle, MarketDataError> {
    if row.len() < 6 {
        return Err(MarketDataError::InvalidResponse(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| MarketDataError::InvalidResponse("kline open time is not an integer".into()))?;
    let timestamp = DateTime::from_timestamp_millis(open_time).ok_or_else(|| {
        MarketDataError::InvalidResponse(format!("kline open time {} out of range", open_time))
    })?;

    Ok(Candle {
        timestamp,
        open: parse_field(&row[1])?,
        high: parse_field(&row[2])?,
        low: parse_field(&row[3])?,
        close: parse_field(&row[4])?,
        volume: parse_field(&row[5])?,
    })
}

/// Binance encodes decimals as strings; accept plain numbers too
fn parse_field(value: &Value) -> Result<f64, MarketDataError> {
    match value {
        Value::String(s) => parse_number(s),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MarketDataError::InvalidResponse(format!("bad number: {}", n))),
        other => Err(MarketDataError::InvalidResponse(format!(
            "expected decimal, got {}",
            other
        ))),
    }
}

fn parse_number(s: &str) -> Result<f64, MarketDataError> {
    s.parse::<f64>()
        .map_err(|_| MarketDataError::InvalidResponse(format!("bad decimal: {:?}", s)))
}
