use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ScanError;

/// Score assigned to symbols without enough history to be ranked.
pub const SENTINEL_SCORE: i32 = -100;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// 24h ticker statistics as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerStat {
    pub symbol: String,
    pub quote_volume: f64,
}

/// Bar interval accepted by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    #[default]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Day1 => "1d",
        }
    }

    pub fn hours_per_bar(&self) -> u32 {
        match self {
            Interval::Hour1 => 1,
            Interval::Hour4 => 4,
            Interval::Day1 => 24,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(Interval::Hour1),
            "4h" => Ok(Interval::Hour4),
            "1d" => Ok(Interval::Day1),
            other => Err(ScanError::InvalidRequest(format!(
                "unsupported interval '{}', expected one of 1h, 4h, 1d",
                other
            ))),
        }
    }
}

/// Bars of one symbol, strictly increasing by timestamp and bounded by the window size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts, drops repeated timestamps (first occurrence wins) and keeps the newest `window` bars.
    pub fn from_bars(mut bars: Vec<Bar>, window: usize) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() > window {
            bars.drain(..bars.len() - window);
        }
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Indicator values attached to a bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub sma_20: f64,
    /// `None` when the loss average over the window is zero
    pub rsi_14: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedBar {
    pub bar: Bar,
    pub snapshot: IndicatorSnapshot,
}

/// Bars that survived indicator derivation, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSeries {
    pub bars: Vec<AnalyzedBar>,
}

impl AnalyzedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&AnalyzedBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.bar.close).collect()
    }

    /// Mean volume of the last `window` bars (fewer if the series is shorter)
    pub fn trailing_average_volume(&self, window: usize) -> Option<f64> {
        if self.bars.is_empty() || window == 0 {
            return None;
        }
        let start = self.bars.len().saturating_sub(window);
        let tail = &self.bars[start..];
        Some(tail.iter().map(|b| b.bar.volume).sum::<f64>() / tail.len() as f64)
    }
}

/// Suggestion label produced by the scoring rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suggestion {
    #[serde(rename = "strong buy")]
    StrongBuy,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "strong sell")]
    StrongSell,
    #[serde(rename = "insufficient data")]
    InsufficientData,
}

impl Suggestion {
    pub fn label(&self) -> &'static str {
        match self {
            Suggestion::StrongBuy => "strong buy",
            Suggestion::Buy => "buy",
            Suggestion::Hold => "hold",
            Suggestion::Sell => "sell",
            Suggestion::StrongSell => "strong sell",
            Suggestion::InsufficientData => "insufficient data",
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score of one symbol after the technical pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub symbol: String,
    pub score: i32,
    pub suggestion: Suggestion,
    /// Latest analyzed bar, absent for sentinel records
    pub latest: Option<AnalyzedBar>,
}

impl ScoreRecord {
    pub fn insufficient(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            score: SENTINEL_SCORE,
            suggestion: Suggestion::InsufficientData,
            latest: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.score == SENTINEL_SCORE && self.suggestion == Suggestion::InsufficientData
    }

    pub fn current_price(&self) -> Option<f64> {
        self.latest.as_ref().map(|b| b.bar.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiStatus {
    #[serde(rename = "undervalued")]
    Undervalued,
    #[serde(rename = "overvalued")]
    Overvalued,
    #[serde(rename = "buying pressure")]
    BuyingPressure,
    #[serde(rename = "selling pressure")]
    SellingPressure,
    #[serde(rename = "not available")]
    NotAvailable,
}

impl RsiStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RsiStatus::Undervalued => "undervalued",
            RsiStatus::Overvalued => "overvalued",
            RsiStatus::BuyingPressure => "buying pressure",
            RsiStatus::SellingPressure => "selling pressure",
            RsiStatus::NotAvailable => "not available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiAction {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "wait")]
    Wait,
    #[serde(rename = "not available")]
    NotAvailable,
}

impl RsiAction {
    pub fn label(&self) -> &'static str {
        match self {
            RsiAction::Buy => "buy",
            RsiAction::Sell => "sell",
            RsiAction::Hold => "hold",
            RsiAction::Wait => "wait",
            RsiAction::NotAvailable => "not available",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiAdvice {
    pub status: RsiStatus,
    pub action: RsiAction,
    pub rsi: Option<f64>,
}

impl RsiAdvice {
    pub fn not_available() -> Self {
        Self {
            status: RsiStatus::NotAvailable,
            action: RsiAction::NotAvailable,
            rsi: None,
        }
    }

    /// Action label with the RSI reading, e.g. `buy (RSI: 25.00)`
    pub fn action_text(&self) -> String {
        match self.rsi {
            Some(rsi) => format!("{} (RSI: {:.2})", self.action.label(), rsi),
            None => self.action.label().to_string(),
        }
    }
}

/// Next-bar forecast from the lag-1 regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortHorizonForecast {
    pub predicted_price: Option<f64>,
    pub percent_change: f64,
    pub forecast_text: String,
}

impl ShortHorizonForecast {
    pub fn not_available() -> Self {
        Self {
            predicted_price: None,
            percent_change: 0.0,
            forecast_text: "not available".to_string(),
        }
    }
}

/// 30-day linear trend projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongHorizonForecast {
    pub predicted_price: Option<f64>,
    pub percent_change: f64,
    pub forecast_timestamp: Option<DateTime<Utc>>,
    pub steps: Option<usize>,
    pub forecast_text: String,
}

impl LongHorizonForecast {
    pub fn not_available() -> Self {
        Self {
            predicted_price: None,
            percent_change: 0.0,
            forecast_timestamp: None,
            steps: None,
            forecast_text: "not available".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentDirection {
    pub fn label(&self) -> &'static str {
        match self {
            SentimentDirection::Bullish => "BULLISH",
            SentimentDirection::Bearish => "BEARISH",
            SentimentDirection::Neutral => "NEUTRAL",
        }
    }
}

/// Simulated sentiment reading. Never a live signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentForecast {
    pub value: f64,
    pub direction: SentimentDirection,
    pub percent_change: f64,
    pub summary: String,
    pub simulated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub rsi: RsiAdvice,
    pub short_horizon: ShortHorizonForecast,
    pub long_horizon: LongHorizonForecast,
    pub sentiment: SentimentForecast,
}

/// Advisory record for one selected symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub symbol: String,
    pub score: i32,
    pub suggestion: Suggestion,
    pub current_price: Option<f64>,
    pub forecasts: ForecastBundle,
}

/// Inbound scan parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanRequest {
    pub limit_symbols: usize,
    pub top_n: usize,
    pub interval: Interval,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            limit_symbols: 200,
            top_n: 10,
            interval: Interval::Hour4,
        }
    }
}

impl ScanRequest {
    pub const LIMIT_RANGE: std::ops::RangeInclusive<usize> = 20..=200;
    pub const TOP_N_RANGE: std::ops::RangeInclusive<usize> = 1..=15;

    pub fn validate(&self) -> Result<(), ScanError> {
        if !Self::LIMIT_RANGE.contains(&self.limit_symbols) {
            return Err(ScanError::InvalidRequest(format!(
                "limit_symbols must be within 20..=200, got {}",
                self.limit_symbols
            )));
        }
        if !Self::TOP_N_RANGE.contains(&self.top_n) {
            return Err(ScanError::InvalidRequest(format!(
                "top_n must be within 1..=15, got {}",
                self.top_n
            )));
        }
        Ok(())
    }
}

/// Per-symbol analysis block of the outbound report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceAnalysis {
    pub rsi_action: String,
    pub rsi_status: String,
    pub ml_30day_percent: f64,
    pub ml_30day_price: Option<f64>,
    pub sentiment_percent: f64,
    pub sentiment_summary: String,
    pub forecast_1step_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceEntry {
    pub score: i32,
    pub suggestion: String,
    pub price: Option<f64>,
    pub analysis: AdviceAnalysis,
}

/// Outbound result contract handed to the API and dashboard layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub status: String,
    /// Unix seconds
    pub timestamp: f64,
    pub interval: Interval,
    pub results: BTreeMap<String, AdviceEntry>,
}
