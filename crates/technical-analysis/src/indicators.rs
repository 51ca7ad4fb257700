use scanner_core::{AnalyzedBar, AnalyzedSeries, IndicatorSnapshot, ScanError, Series};

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Relative Strength Index over a simple rolling mean of gains and losses.
///
/// Entry `k` belongs to `data[k + period]`. A window whose loss average is
/// zero has no defined ratio and yields `None`.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    changes
        .windows(period)
        .map(|window| {
            let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
            let avg_loss = window.iter().filter(|c| **c < 0.0).map(|c| -c).sum::<f64>() / period as f64;

            if avg_loss == 0.0 {
                return None;
            }

            let rs = avg_gain / avg_loss;
            Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
        })
        .collect()
}

/// Derives the moving average and RSI for every bar of a series
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    pub sma_period: usize,
    pub rsi_period: usize,
    pub min_valid_bars: usize,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            sma_period: 20,
            rsi_period: 14,
            min_valid_bars: 20,
        }
    }
}

impl IndicatorEngine {
    pub fn new(min_valid_bars: usize) -> Self {
        Self {
            min_valid_bars,
            ..Default::default()
        }
    }

    /// Index of the first bar with a full window for both indicators
    pub fn warmup(&self) -> usize {
        (self.sma_period.saturating_sub(1)).max(self.rsi_period)
    }

    /// Attach indicator snapshots, dropping leading bars without full windows.
    pub fn analyze(&self, series: &Series) -> Result<AnalyzedSeries, ScanError> {
        let bars = series.bars();
        if bars.is_empty() {
            return Err(ScanError::DataUnavailable("empty series".to_string()));
        }

        let available = bars.len().saturating_sub(self.warmup());
        if available < self.min_valid_bars {
            return Err(ScanError::InsufficientHistory {
                required: self.min_valid_bars,
                available,
            });
        }

        let closes = series.closes();
        let sma_values = sma(&closes, self.sma_period);
        let rsi_values = rsi(&closes, self.rsi_period);

        let analyzed = (self.warmup()..bars.len())
            .map(|i| AnalyzedBar {
                bar: bars[i].clone(),
                snapshot: IndicatorSnapshot {
                    sma_20: sma_values[i + 1 - self.sma_period],
                    rsi_14: rsi_values[i - self.rsi_period],
                },
            })
            .collect();

        Ok(AnalyzedSeries { bars: analyzed })
    }
}
