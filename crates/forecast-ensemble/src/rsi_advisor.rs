use scanner_core::{AnalyzedSeries, RsiAction, RsiAdvice, RsiStatus};

/// Fixed-band reading of the latest RSI. No fitting involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiAdvisor;

impl RsiAdvisor {
    pub fn new() -> Self {
        Self
    }

    pub fn advise(&self, series: Option<&AnalyzedSeries>) -> RsiAdvice {
        let rsi = series
            .and_then(|s| s.latest())
            .and_then(|latest| latest.snapshot.rsi_14);

        match rsi {
            Some(rsi) => Self::classify(rsi),
            None => RsiAdvice::not_available(),
        }
    }

    pub fn classify(rsi: f64) -> RsiAdvice {
        let (status, action) = if rsi < 30.0 {
            (RsiStatus::Undervalued, RsiAction::Buy)
        } else if rsi > 70.0 {
            (RsiStatus::Overvalued, RsiAction::Sell)
        } else if rsi > 50.0 {
            (RsiStatus::BuyingPressure, RsiAction::Hold)
        } else {
            (RsiStatus::SellingPressure, RsiAction::Wait)
        };

        RsiAdvice { status, action, rsi: Some(rsi) }
    }
}
