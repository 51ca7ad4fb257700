use scanner_core::{
    AnalyzedSeries, ForecastBundle, ForecastConfig, Interval, LongHorizonForecast, ScanError,
    SentimentForecast, ShortHorizonForecast,
};

pub mod regression;
pub mod rsi_advisor;
pub mod sentiment;

pub use regression::{ols, LinearFit, LongHorizonTrendExtrapolator, ShortHorizonRegressor};
pub use rsi_advisor::RsiAdvisor;
pub use sentiment::{fnv1a_64, simulated_value, SentimentSimulator};

/// Runs the four per-symbol estimators. Each one fails soft on its own.
#[derive(Debug, Clone)]
pub struct ForecastEnsemble {
    rsi_advisor: RsiAdvisor,
    short_horizon: ShortHorizonRegressor,
    long_horizon: LongHorizonTrendExtrapolator,
    sentiment: SentimentSimulator,
}

impl Default for ForecastEnsemble {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

impl ForecastEnsemble {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            rsi_advisor: RsiAdvisor::new(),
            short_horizon: ShortHorizonRegressor::new(config.min_regression_samples),
            long_horizon: LongHorizonTrendExtrapolator {
                min_samples: config.min_regression_samples,
                horizon_hours: config.horizon_hours,
                min_steps: config.min_horizon_steps,
            },
            sentiment: SentimentSimulator::new(
                config.sentiment_threshold,
                config.sentiment_percent_multiplier,
            ),
        }
    }

    pub fn simulate_sentiment(&self, symbol: &str) -> SentimentForecast {
        self.sentiment.simulate(symbol)
    }

    /// Forecasts for one symbol. `series` is `None` when nothing could be fetched.
    pub fn forecast(&self, symbol: &str, series: Option<&AnalyzedSeries>, interval: Interval) -> ForecastBundle {
        let rsi = self.rsi_advisor.advise(series);

        let short_horizon = match series {
            Some(s) => self.short_horizon.forecast(&s.closes()),
            None => Err(ScanError::DataUnavailable(symbol.to_string())),
        };
        let short_horizon = short_horizon.unwrap_or_else(|e| {
            tracing::debug!("Short-horizon forecast unavailable for {}: {}", symbol, e);
            ShortHorizonForecast::not_available()
        });

        let long_horizon = match series {
            Some(s) => self.long_horizon.forecast(s, interval),
            None => Err(ScanError::DataUnavailable(symbol.to_string())),
        };
        let long_horizon = long_horizon.unwrap_or_else(|e| {
            tracing::debug!("Long-horizon forecast unavailable for {}: {}", symbol, e);
            LongHorizonForecast::not_available()
        });

        ForecastBundle {
            rsi,
            short_horizon,
            long_horizon,
            sentiment: self.sentiment.simulate(symbol),
        }
    }
}
