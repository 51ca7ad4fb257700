use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ScanError;

/// Symbols scanned on every run regardless of volume rank
pub const DEFAULT_MANDATORY_SYMBOLS: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT",
    "AVAXUSDT", "DOTUSDT", "LINKUSDT", "ZECUSDT",
];

/// Weights and thresholds of the scoring rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub rsi_strong_oversold: f64,  // 30
    pub rsi_oversold: f64,         // 40
    pub rsi_strong_overbought: f64, // 70
    pub rsi_overbought: f64,       // 60
    pub strong_rsi_points: i32,    // 60
    pub rsi_points: i32,           // 30
    pub above_ma_points: i32,      // 40
    pub below_ma_points: i32,      // 20
    pub volume_spike_ratio: f64,   // 1.5
    pub volume_spike_points: i32,  // 15
    pub volume_window: usize,      // 50
    pub min_valid_bars: usize,     // 20
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rsi_strong_oversold: 30.0,
            rsi_oversold: 40.0,
            rsi_strong_overbought: 70.0,
            rsi_overbought: 60.0,
            strong_rsi_points: 60,
            rsi_points: 30,
            above_ma_points: 40,
            below_ma_points: 20,
            volume_spike_ratio: 1.5,
            volume_spike_points: 15,
            volume_window: 50,
            min_valid_bars: 20,
        }
    }
}

/// Tunables of the forecast estimators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Minimum regression sample size (lag-aligned pairs for the short horizon)
    pub min_regression_samples: usize,
    /// Horizon of the trend projection in hours
    pub horizon_hours: u32,
    /// Lower bound on extrapolated steps
    pub min_horizon_steps: usize,
    pub sentiment_threshold: f64,
    pub sentiment_percent_multiplier: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_regression_samples: 50,
            horizon_hours: 30 * 24,
            min_horizon_steps: 10,
            sentiment_threshold: 0.15,
            sentiment_percent_multiplier: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    // Universe
    pub quote_asset: String,
    pub min_quote_volume: f64,
    pub leveraged_markers: Vec<String>,
    pub mandatory_symbols: Vec<String>,

    // Data
    pub window_size: usize,

    // Scoring
    pub scoring: ScoringWeights,
    pub include_sentiment_in_score: bool,
    pub sentiment_score_bonus: i32,

    // Forecasts
    pub forecast: ForecastConfig,

    // Execution
    pub concurrency: usize,
    pub symbol_timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            min_quote_volume: 500_000.0,
            leveraged_markers: vec!["UP".to_string(), "DOWN".to_string()],
            mandatory_symbols: DEFAULT_MANDATORY_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            window_size: 100,
            scoring: ScoringWeights::default(),
            include_sentiment_in_score: false,
            sentiment_score_bonus: 10,
            forecast: ForecastConfig::default(),
            concurrency: 8,
            symbol_timeout_secs: 10,
            cache_ttl_secs: 15 * 60,
        }
    }
}

impl ScannerConfig {
    pub fn symbol_timeout(&self) -> Duration {
        Duration::from_secs(self.symbol_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.quote_asset.is_empty() {
            return Err(ScanError::Config("quote_asset must not be empty".to_string()));
        }
        if let Some(bad) = self
            .mandatory_symbols
            .iter()
            .find(|s| !s.ends_with(&self.quote_asset) || s.len() == self.quote_asset.len())
        {
            return Err(ScanError::Config(format!(
                "mandatory symbol {} is not a {} pair",
                bad, self.quote_asset
            )));
        }
        if !(1..=32).contains(&self.concurrency) {
            return Err(ScanError::Config(format!(
                "concurrency must be within 1..=32, got {}",
                self.concurrency
            )));
        }
        if self.symbol_timeout_secs == 0 {
            return Err(ScanError::Config("symbol_timeout_secs must be positive".to_string()));
        }
        // 19 leading bars are consumed by the indicator windows
        if self.window_size < self.scoring.min_valid_bars + 19 {
            return Err(ScanError::Config(format!(
                "window_size {} leaves fewer than {} analyzable bars",
                self.window_size, self.scoring.min_valid_bars
            )));
        }
        if self.forecast.min_regression_samples < 2 {
            return Err(ScanError::Config("min_regression_samples must be at least 2".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mandatory_symbols.len(), 11);
        assert_eq!(config.cache_ttl(), Duration::from_secs(900));
    }

    #[test]
    fn test_rejects_foreign_mandatory_symbol() {
        let mut config = ScannerConfig::default();
        config.mandatory_symbols.push("BTCEUR".to_string());
        assert!(matches!(config.validate(), Err(ScanError::Config(_))));
    }

    #[test]
    fn test_rejects_short_window() {
        let config = ScannerConfig { window_size: 30, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
