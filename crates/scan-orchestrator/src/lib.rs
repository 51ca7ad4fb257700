use binance_client::BinanceClient;
use scanner_core::{MarketDataSource, ScanError, ScanRequest, ScannerConfig};
use std::sync::Arc;

pub mod cache;
pub mod fetcher;
pub mod pipeline;
pub mod report;
pub mod selection;
pub mod universe;

#[cfg(test)]
mod test_support;

pub use cache::{ScanCache, ScanKey};
pub use fetcher::MarketDataFetcher;
pub use pipeline::{ScanPipeline, SymbolScan};
pub use report::{aggregate, ScanOutcome};
pub use selection::{rank, SelectionPolicy};
pub use universe::SymbolUniverseSelector;

/// Entry point for scans. Results are memoized per (universe size, top_n, interval).
pub struct ScanOrchestrator {
    pipeline: Arc<ScanPipeline>,
    cache: ScanCache<ScanOutcome>,
}

impl ScanOrchestrator {
    pub fn new(config: ScannerConfig, client: BinanceClient) -> Result<Self, ScanError> {
        Self::with_source(config, Arc::new(client))
    }

    pub fn with_source(config: ScannerConfig, source: Arc<dyn MarketDataSource>) -> Result<Self, ScanError> {
        let cache = ScanCache::new(config.cache_ttl());
        Ok(Self {
            pipeline: Arc::new(ScanPipeline::new(config, source)?),
            cache,
        })
    }

    /// Cached scan. Concurrent callers with the same request share one run.
    pub async fn scan(&self, request: ScanRequest) -> Result<Arc<ScanOutcome>, ScanError> {
        request.validate()?;
        let pipeline = Arc::clone(&self.pipeline);
        self.cache
            .get_or_compute(ScanKey::from(&request), || async move { pipeline.run(request).await })
            .await
    }

    /// Uncached scan
    pub async fn run_scan(&self, request: ScanRequest) -> Result<ScanOutcome, ScanError> {
        request.validate()?;
        self.pipeline.run(request).await
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use scanner_core::{Interval, RsiStatus, Suggestion};

    fn config(mandatory: &[&str]) -> ScannerConfig {
        ScannerConfig {
            mandatory_symbols: mandatory.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn market() -> MockSource {
        MockSource::new()
            .with_ticker_stats(vec![
                stat("BTCUSDT", 9_000_000.0),
                stat("PEPEUSDT", 5_000_000.0),
                stat("SOLUSDT", 3_000_000.0),
                stat("BTCUPUSDT", 2_000_000.0),
            ])
            .with_bars("BTCUSDT", oversold_uptrend_bars())
            .with_bars("PEPEUSDT", rising_bars(20.0))
            .with_bars("SOLUSDT", rising_bars(60.0))
            .with_bars("ETHUSDT", rising_bars(40.0))
    }

    #[tokio::test]
    async fn test_scan_end_to_end() {
        let orchestrator =
            ScanOrchestrator::with_source(config(&["BTCUSDT", "ETHUSDT", "ZECUSDT"]), Arc::new(market())).unwrap();
        let request = ScanRequest { limit_symbols: 20, top_n: 2, interval: Interval::Hour4 };
        let outcome = orchestrator.scan(request).await.unwrap();

        assert_eq!(outcome.scanned, 5);
        assert_eq!(outcome.ranked.len(), 4);
        assert!(outcome.ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(outcome.ranking(1)[0].symbol, "BTCUSDT");

        for symbol in ["BTCUSDT", "ETHUSDT", "ZECUSDT"] {
            assert_eq!(outcome.results.iter().filter(|r| r.symbol == symbol).count(), 1);
        }
        assert!(outcome.results.len() >= 3 && outcome.results.len() <= 4);

        let btc = outcome.result("BTCUSDT").unwrap();
        assert_eq!(btc.score, 115);
        assert_eq!(btc.suggestion, Suggestion::StrongBuy);
        assert_eq!(btc.forecasts.rsi.status, RsiStatus::Undervalued);
        assert!(btc.forecasts.long_horizon.predicted_price.is_some());
    }

    #[tokio::test]
    async fn test_empty_mandatory_symbol_still_reported() {
        let orchestrator =
            ScanOrchestrator::with_source(config(&["BTCUSDT", "ZECUSDT"]), Arc::new(market())).unwrap();
        let outcome = orchestrator.run_scan(ScanRequest::default()).await.unwrap();

        let zec = outcome.result("ZECUSDT").unwrap();
        assert_eq!(zec.score, -100);
        assert_eq!(zec.suggestion, Suggestion::InsufficientData);
        assert_eq!(zec.current_price, None);
        assert_eq!(zec.forecasts.rsi.status, RsiStatus::NotAvailable);
        assert_eq!(zec.forecasts.short_horizon.forecast_text, "not available");
        assert_eq!(zec.forecasts.long_horizon.forecast_text, "not available");
        assert!(outcome.ranked.iter().all(|r| r.symbol != "ZECUSDT"));

        let json = serde_json::to_value(outcome.to_report()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["interval"], "4h");
        assert_eq!(json["results"]["ZECUSDT"]["score"], -100);
        assert_eq!(json["results"]["ZECUSDT"]["suggestion"], "insufficient data");
        assert!(json["results"]["ZECUSDT"]["price"].is_null());
        assert_eq!(json["results"]["ZECUSDT"]["analysis"]["rsi_action"], "not available");
        assert_eq!(json["results"]["BTCUSDT"]["analysis"]["rsi_action"], "buy (RSI: 25.00)");
    }

    #[tokio::test]
    async fn test_no_data_when_nothing_usable() {
        let orchestrator = ScanOrchestrator::with_source(
            config(&["ZECUSDT"]),
            Arc::new(MockSource::new().failing_ticker_stats()),
        )
        .unwrap();
        assert_eq!(orchestrator.scan(ScanRequest::default()).await.unwrap_err(), ScanError::NoData);
    }

    #[tokio::test]
    async fn test_repeated_scan_is_served_from_cache() {
        let source = Arc::new(market());
        let orchestrator = ScanOrchestrator::with_source(config(&["BTCUSDT"]), source.clone()).unwrap();

        let first = orchestrator.scan(ScanRequest::default()).await.unwrap();
        let calls = source.kline_calls();
        let second = orchestrator.scan(ScanRequest::default()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.kline_calls(), calls);

        orchestrator.scan(ScanRequest { top_n: 3, ..Default::default() }).await.unwrap();
        assert_eq!(source.kline_calls(), calls * 2);

        orchestrator.invalidate_cache();
        orchestrator.scan(ScanRequest::default()).await.unwrap();
        assert_eq!(source.kline_calls(), calls * 3);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let orchestrator = ScanOrchestrator::with_source(config(&["BTCUSDT"]), Arc::new(market())).unwrap();
        let bad = ScanRequest { top_n: 0, ..Default::default() };
        assert!(matches!(orchestrator.scan(bad).await, Err(ScanError::InvalidRequest(_))));
        let bad = ScanRequest { limit_symbols: 500, ..Default::default() };
        assert!(matches!(orchestrator.run_scan(bad).await, Err(ScanError::InvalidRequest(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = ScannerConfig { concurrency: 0, ..config(&["BTCUSDT"]) };
        assert!(matches!(
            ScanOrchestrator::with_source(bad, Arc::new(MockSource::new())),
            Err(ScanError::Config(_))
        ));
    }
}
