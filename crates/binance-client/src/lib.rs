use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use scanner_core::{Bar, Interval, MarketDataSource, ScanError, TickerStat};
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Requests per minute allowed by default. Binance grants 6000 weight/min; klines cost 2.
pub const DEFAULT_RATE_LIMIT: usize = 600;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Binance API slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Client for the public Binance spot REST API
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT)
    }
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, rate_limit_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            rate_limiter: RateLimiter::new(rate_limit_per_minute, Duration::from_secs(60)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a rate-limited GET and decode the JSON body. No retries.
    async fn get_json(&self, builder: reqwest::RequestBuilder) -> Result<Value, ScanError> {
        self.rate_limiter.acquire().await;

        let response = builder
            .send()
            .await
            .map_err(|e| ScanError::UpstreamTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::UpstreamTransport(format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ScanError::UpstreamTransport(format!("malformed payload: {}", e)))
    }

    /// 24h statistics for every symbol on the exchange
    pub async fn get_ticker_stats(&self) -> Result<Vec<TickerStat>, ScanError> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let payload = self.get_json(self.client.get(&url)).await?;
        let stats = parse_ticker_stats(&payload)?;
        tracing::debug!("Fetched {} ticker statistics from Binance", stats.len());
        Ok(stats)
    }

    /// Most recent `limit` klines for a symbol, oldest first
    pub async fn get_klines(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Bar>, ScanError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let payload = self
            .get_json(self.client.get(&url).query(&[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                ("limit", &limit.to_string()),
            ]))
            .await?;
        parse_klines(&payload)
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn ticker_stats(&self) -> Result<Vec<TickerStat>, ScanError> {
        self.get_ticker_stats().await
    }

    async fn klines(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Bar>, ScanError> {
        self.get_klines(symbol, interval, limit).await
    }
}

/// Binance encodes decimals as strings; accept plain numbers too.
fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// One entry of `/api/v3/ticker/24hr`. Only the fields the universe needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hr {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    quote_volume: Option<Value>,
}

/// Decode the `/api/v3/ticker/24hr` payload.
///
/// Entries without a symbol are skipped; a missing or unreadable `quoteVolume` counts as zero.
pub fn parse_ticker_stats(payload: &Value) -> Result<Vec<TickerStat>, ScanError> {
    let entries = Vec::<Ticker24hr>::deserialize(payload)
        .map_err(|e| ScanError::UpstreamTransport(format!("malformed ticker payload: {}", e)))?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let quote_volume = entry.quote_volume.as_ref().and_then(value_as_f64).unwrap_or(0.0);
            entry.symbol.map(|symbol| TickerStat { symbol, quote_volume })
        })
        .collect())
}

/// Decode the `/api/v3/klines` payload.
///
/// Each row is `[open_time_ms, open, high, low, close, volume, close_time_ms, ...]`.
/// Any malformed row rejects the whole payload.
pub fn parse_klines(payload: &Value) -> Result<Vec<Bar>, ScanError> {
    let rows = payload
        .as_array()
        .ok_or_else(|| ScanError::UpstreamTransport("kline payload is not an array".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_kline_row(row).ok_or_else(|| {
            ScanError::UpstreamTransport(format!("malformed kline row {}", i))
        }))
        .collect()
}

fn parse_kline_row(row: &Value) -> Option<Bar> {
    let fields = row.as_array()?;
    if fields.len() < 6 {
        return None;
    }

    let open_time = fields[0].as_i64()?;
    Some(Bar {
        timestamp: DateTime::from_timestamp_millis(open_time)?,
        open: value_as_f64(&fields[1])?,
        high: value_as_f64(&fields[2])?,
        low: value_as_f64(&fields[3])?,
        close: value_as_f64(&fields[4])?,
        volume: value_as_f64(&fields[5])?,
    })
}
