use async_trait::async_trait;
use crate::{Bar, Interval, ScanError, TickerStat};

/// Upstream market-data provider.
///
/// Implementations report failures as `ScanError::UpstreamTransport`; degrading
/// to empty results is the caller's job.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 24h statistics for every listed pair
    async fn ticker_stats(&self) -> Result<Vec<TickerStat>, ScanError>;

    /// Most recent `limit` bars for `symbol`, oldest first
    async fn klines(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Bar>, ScanError>;
}
