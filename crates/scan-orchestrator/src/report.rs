use chrono::{DateTime, Utc};
use scanner_core::{
    AdviceAnalysis, AdviceEntry, ForecastBundle, ResultRecord, ScanReport, ScanRequest, ScoreRecord,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything one scan produced
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub request: ScanRequest,
    pub generated_at: DateTime<Utc>,
    /// Size of the scanned universe
    pub scanned: usize,
    /// Non-sentinel records, best score first
    pub ranked: Vec<ScoreRecord>,
    /// Selected symbols with their forecasts, in selection order
    pub results: Vec<ResultRecord>,
}

impl ScanOutcome {
    /// Top `n` entries of the ranked universe
    pub fn ranking(&self, n: usize) -> &[ScoreRecord] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    pub fn result(&self, symbol: &str) -> Option<&ResultRecord> {
        self.results.iter().find(|r| r.symbol == symbol)
    }

    /// Outbound report keyed by symbol
    pub fn to_report(&self) -> ScanReport {
        let results: BTreeMap<String, AdviceEntry> = self
            .results
            .iter()
            .map(|r| (r.symbol.clone(), advice_entry(r)))
            .collect();

        ScanReport {
            status: "success".to_string(),
            timestamp: self.generated_at.timestamp_micros() as f64 / 1_000_000.0,
            interval: self.request.interval,
            results,
        }
    }
}

pub fn aggregate(record: ScoreRecord, forecasts: ForecastBundle) -> ResultRecord {
    let current_price = record.current_price();
    ResultRecord {
        symbol: record.symbol,
        score: record.score,
        suggestion: record.suggestion,
        current_price,
        forecasts,
    }
}

fn advice_entry(record: &ResultRecord) -> AdviceEntry {
    let f = &record.forecasts;
    AdviceEntry {
        score: record.score,
        suggestion: record.suggestion.label().to_string(),
        price: record.current_price,
        analysis: AdviceAnalysis {
            rsi_action: f.rsi.action_text(),
            rsi_status: f.rsi.status.label().to_string(),
            ml_30day_percent: f.long_horizon.percent_change,
            ml_30day_price: f.long_horizon.predicted_price,
            sentiment_percent: f.sentiment.percent_change,
            sentiment_summary: f.sentiment.summary.clone(),
            forecast_1step_price: f.short_horizon.predicted_price,
        },
    }
}
