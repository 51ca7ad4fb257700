use anyhow::{Context, Result};
use binance_client::{DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT};
use scanner_core::{ScanRequest, ScannerConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    // Provider
    pub binance_base_url: String,
    pub binance_rate_limit: usize, // requests per minute

    pub scanner: ScannerConfig,
    pub request: ScanRequest,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ScannerConfig::default();
        let default_request = ScanRequest::default();

        let mandatory_symbols = match lookup("SCAN_MANDATORY_SYMBOLS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.mandatory_symbols.clone(),
        };

        let mut forecast = defaults.forecast.clone();
        forecast.min_regression_samples = parse_or(
            &lookup,
            "SCAN_MIN_REGRESSION_SAMPLES",
            forecast.min_regression_samples,
        )?;

        let scanner = ScannerConfig {
            quote_asset: lookup("SCAN_QUOTE_ASSET")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_else(|| defaults.quote_asset.clone()),
            min_quote_volume: parse_or(&lookup, "SCAN_MIN_QUOTE_VOLUME", defaults.min_quote_volume)?,
            mandatory_symbols,
            window_size: parse_or(&lookup, "SCAN_WINDOW_SIZE", defaults.window_size)?,
            include_sentiment_in_score: parse_or(
                &lookup,
                "SCAN_INCLUDE_SENTIMENT",
                defaults.include_sentiment_in_score,
            )?,
            forecast,
            concurrency: parse_or(&lookup, "SCAN_CONCURRENCY", defaults.concurrency)?,
            symbol_timeout_secs: parse_or(&lookup, "SCAN_SYMBOL_TIMEOUT_SECS", defaults.symbol_timeout_secs)?,
            cache_ttl_secs: parse_or(&lookup, "SCAN_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            ..defaults
        };

        let request = ScanRequest {
            limit_symbols: parse_or(&lookup, "SCAN_LIMIT_SYMBOLS", default_request.limit_symbols)?,
            top_n: parse_or(&lookup, "SCAN_TOP_N", default_request.top_n)?,
            interval: parse_or(&lookup, "SCAN_INTERVAL", default_request.interval)?,
        };

        let config = Self {
            binance_base_url: lookup("BINANCE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            binance_rate_limit: parse_or(&lookup, "BINANCE_RATE_LIMIT", DEFAULT_RATE_LIMIT)?,
            scanner,
            request,
        };

        config.scanner.validate().context("invalid scanner configuration")?;
        config.request.validate().context("invalid scan request")?;

        Ok(config)
    }
}
