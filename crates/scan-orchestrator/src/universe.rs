use scanner_core::{MarketDataSource, ScannerConfig, TickerStat};
use std::collections::HashSet;

/// Builds the list of symbols to scan: the most traded quote-asset pairs
/// plus the mandatory watch-list.
#[derive(Debug, Clone)]
pub struct SymbolUniverseSelector {
    quote_asset: String,
    min_quote_volume: f64,
    leveraged_markers: Vec<String>,
    mandatory: Vec<String>,
}

impl SymbolUniverseSelector {
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            quote_asset: config.quote_asset.clone(),
            min_quote_volume: config.min_quote_volume,
            leveraged_markers: config.leveraged_markers.clone(),
            mandatory: config.mandatory_symbols.clone(),
        }
    }

    /// Leveraged tokens are named `<BASE><MARKER><QUOTE>`, e.g. `BTCUPUSDT`, and
    /// always trade next to their underlying pair. A marker-like suffix whose
    /// underlying is not listed (`JUPUSDT`, `SYRUPUSDT`) is a regular coin.
    pub fn is_leveraged(&self, symbol: &str, listed: &HashSet<&str>) -> bool {
        let Some(base) = symbol.strip_suffix(self.quote_asset.as_str()) else {
            return false;
        };
        self.leveraged_markers.iter().any(|marker| {
            base.strip_suffix(marker.as_str())
                .filter(|underlying| !underlying.is_empty())
                .map(|underlying| listed.contains(format!("{}{}", underlying, self.quote_asset).as_str()))
                .unwrap_or(false)
        })
    }

    /// Volume-filtered pairs, highest quote volume first, at most `limit`.
    pub fn dynamic_symbols(&self, stats: &[TickerStat], limit: usize) -> Vec<String> {
        let listed: HashSet<&str> = stats.iter().map(|t| t.symbol.as_str()).collect();
        let mut pairs: Vec<&TickerStat> = stats
            .iter()
            .filter(|t| t.symbol.ends_with(&self.quote_asset) && t.symbol.len() > self.quote_asset.len())
            .filter(|t| t.quote_volume > self.min_quote_volume)
            .filter(|t| !self.is_leveraged(&t.symbol, &listed))
            .collect();

        pairs.sort_by(|a, b| {
            b.quote_volume
                .partial_cmp(&a.quote_volume)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        pairs.into_iter().take(limit).map(|t| t.symbol.clone()).collect()
    }

    /// Dynamic symbols in rank order, then mandatory symbols not already present.
    pub fn merge_mandatory(&self, dynamic: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        dynamic
            .into_iter()
            .chain(self.mandatory.iter().cloned())
            .filter(|s| seen.insert(s.clone()))
            .collect()
    }

    /// Full universe. Provider failure only drops the dynamic part.
    pub async fn build(&self, source: &dyn MarketDataSource, limit: usize) -> Vec<String> {
        let dynamic = match source.ticker_stats().await {
            Ok(stats) => self.dynamic_symbols(&stats, limit),
            Err(e) => {
                tracing::warn!("Ticker statistics unavailable, scanning mandatory symbols only: {}", e);
                Vec::new()
            }
        };

        let dynamic_count = dynamic.len();
        let universe = self.merge_mandatory(dynamic);
        tracing::info!(
            "Symbol universe: {} symbols ({} dynamic, {} mandatory)",
            universe.len(),
            dynamic_count,
            self.mandatory.len()
        );
        universe
    }
}
