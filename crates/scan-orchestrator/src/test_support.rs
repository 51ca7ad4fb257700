use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use scanner_core::{Interval, MarketDataSource, ScanError, TickerStat};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub use scanner_core::Bar;

/// In-memory provider. Unknown symbols and missing ticker statistics are errors.
#[derive(Default)]
pub struct MockSource {
    bars: HashMap<String, Vec<Bar>>,
    ticker_stats: Option<Vec<TickerStat>>,
    delays: HashMap<String, Duration>,
    kline_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            ticker_stats: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_ticker_stats(mut self, stats: Vec<TickerStat>) -> Self {
        self.ticker_stats = Some(stats);
        self
    }

    pub fn failing_ticker_stats(mut self) -> Self {
        self.ticker_stats = None;
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn kline_calls(&self) -> usize {
        self.kline_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockSource {
    async fn ticker_stats(&self) -> Result<Vec<TickerStat>, ScanError> {
        self.ticker_stats
            .clone()
            .ok_or_else(|| ScanError::UpstreamTransport("ticker endpoint down".to_string()))
    }

    async fn klines(&self, symbol: &str, _interval: Interval, _limit: usize) -> Result<Vec<Bar>, ScanError> {
        self.kline_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        self.bars
            .get(symbol)
            .cloned()
            .ok_or_else(|| ScanError::UpstreamTransport(format!("unknown symbol {}", symbol)))
    }
}

pub fn stat(symbol: &str, quote_volume: f64) -> TickerStat {
    TickerStat { symbol: symbol.to_string(), quote_volume }
}

pub fn bar(i: i64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + ChronoDuration::hours(4 * i),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i as i64, c, 1000.0))
        .collect()
}

/// Gently oscillating uptrend, 100 bars. Scores positive without a volume spike.
pub fn rising_bars(base: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..100)
        .map(|i| base + i as f64 * 0.5 + (i as f64 * 0.7).sin() * 2.0)
        .collect();
    bars_from_closes(&closes)
}

/// Climb, short pullback, partial recovery, then a 2x volume spike: RSI 25 above SMA(20).
pub fn oversold_uptrend_bars() -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..=85).map(|i| 100.0 + 10.0 * i as f64).collect();
    let mut price = 950.0;
    for _ in 0..7 {
        price -= 3.0;
        closes.push(price);
    }
    for _ in 0..7 {
        price += 1.0;
        closes.push(price);
    }

    // 49 bars at 960 and a final 1960 average 980 over the last 50: exactly a 2x spike
    let mut bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i as i64, c, 960.0))
        .collect();
    if let Some(last) = bars.last_mut() {
        last.volume = 1960.0;
    }
    bars
}
