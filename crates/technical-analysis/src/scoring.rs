use scanner_core::{AnalyzedSeries, ScoreRecord, ScoringWeights, SentimentDirection, Suggestion};

/// Turns the latest indicator snapshot into an integer score and suggestion.
///
/// Rules run once, in order:
/// 1. RSI below the strong-oversold threshold adds the strong RSI points, "strong buy"
/// 2. otherwise RSI below the oversold threshold adds the RSI points, "buy" over "hold"
/// 3. otherwise RSI above the strong-overbought threshold subtracts the strong points, "strong sell"
/// 4. otherwise RSI above the overbought threshold subtracts the RSI points, "sell" over "hold"
/// 5. close above the SMA adds trend points and upgrades "buy"/"hold" to "strong buy"
/// 6. otherwise close below the SMA subtracts the downtrend points
/// 7. latest volume above `volume_spike_ratio` times the trailing average adds volume points
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, symbol: &str, series: &AnalyzedSeries) -> ScoreRecord {
        let w = &self.weights;

        let latest = match series.latest() {
            Some(latest) if series.len() >= w.min_valid_bars => latest,
            _ => return ScoreRecord::insufficient(symbol),
        };

        let mut score = 0i32;
        let mut suggestion = Suggestion::Hold;

        if let Some(rsi) = latest.snapshot.rsi_14 {
            if rsi < w.rsi_strong_oversold {
                score += w.strong_rsi_points;
                suggestion = Suggestion::StrongBuy;
            } else if rsi < w.rsi_oversold {
                score += w.rsi_points;
                if suggestion == Suggestion::Hold {
                    suggestion = Suggestion::Buy;
                }
            } else if rsi > w.rsi_strong_overbought {
                score -= w.strong_rsi_points;
                suggestion = Suggestion::StrongSell;
            } else if rsi > w.rsi_overbought {
                score -= w.rsi_points;
                if suggestion == Suggestion::Hold {
                    suggestion = Suggestion::Sell;
                }
            }
        }

        let close = latest.bar.close;
        let ma = latest.snapshot.sma_20;
        if close > ma {
            score += w.above_ma_points;
            if matches!(suggestion, Suggestion::Buy | Suggestion::Hold) {
                suggestion = Suggestion::StrongBuy;
            }
        } else if close < ma {
            score -= w.below_ma_points;
        }

        if let Some(avg_volume) = series.trailing_average_volume(w.volume_window) {
            if latest.bar.volume > avg_volume * w.volume_spike_ratio {
                score += w.volume_spike_points;
            }
        }

        ScoreRecord {
            symbol: symbol.to_string(),
            score,
            suggestion,
            latest: Some(latest.clone()),
        }
    }

    /// Score, then fold a simulated sentiment reading in as a flat bonus or penalty.
    /// The suggestion is left untouched and sentinel records are never adjusted.
    pub fn score_with_sentiment(
        &self,
        symbol: &str,
        series: &AnalyzedSeries,
        sentiment: SentimentDirection,
        bonus: i32,
    ) -> ScoreRecord {
        let mut record = self.score(symbol, series);
        if record.is_sentinel() {
            return record;
        }
        match sentiment {
            SentimentDirection::Bullish => record.score += bonus,
            SentimentDirection::Bearish => record.score -= bonus,
            SentimentDirection::Neutral => {}
        }
        record
    }
}
