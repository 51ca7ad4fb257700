use scanner_core::{Interval, MarketDataSource, Series};
use std::sync::Arc;

/// Fail-soft wrapper around the provider: every failure becomes an empty series.
#[derive(Clone)]
pub struct MarketDataFetcher {
    source: Arc<dyn MarketDataSource>,
    window: usize,
}

impl MarketDataFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>, window: usize) -> Self {
        Self { source, window }
    }

    pub fn source(&self) -> &dyn MarketDataSource {
        self.source.as_ref()
    }

    /// Latest `window` bars of `symbol` in ascending time order, or an empty series.
    pub async fn fetch(&self, symbol: &str, interval: Interval) -> Series {
        match self.source.klines(symbol, interval, self.window).await {
            Ok(bars) => {
                let series = Series::from_bars(bars, self.window);
                tracing::debug!("Fetched {} {} bars for {}", series.len(), interval, symbol);
                series
            }
            Err(e) => {
                tracing::warn!("Fetching {} bars for {} failed: {}", interval, symbol, e);
                Series::empty()
            }
        }
    }
}
