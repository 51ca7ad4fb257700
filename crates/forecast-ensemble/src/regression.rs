use chrono::Duration;
use scanner_core::{AnalyzedSeries, Interval, LongHorizonForecast, ScanError, ShortHorizonForecast};
use statrs::statistics::Statistics;

/// Fitted `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares with a single predictor.
///
/// A predictor without variance only fits when the response is flat as well
/// (slope 0 through the mean); otherwise the fit is degenerate.
pub fn ols(xs: &[f64], ys: &[f64]) -> Result<LinearFit, ScanError> {
    if xs.len() != ys.len() {
        return Err(ScanError::ModelFitFailure(format!(
            "predictor and response lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(ScanError::InsufficientHistory { required: 2, available: xs.len() });
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(ScanError::ModelFitFailure("non-finite sample".to_string()));
    }

    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let n = xs.len() as f64;
    let x_scale = xs.iter().fold(0.0f64, |acc, v| acc.max(v.abs())).max(1.0);
    let y_scale = ys.iter().fold(0.0f64, |acc, v| acc.max(v.abs())).max(1.0);

    if sxx <= f64::EPSILON * n * x_scale * x_scale {
        if syy <= f64::EPSILON * n * y_scale * y_scale {
            return Ok(LinearFit { slope: 0.0, intercept: mean_y });
        }
        return Err(ScanError::ModelFitFailure("predictor has no variance".to_string()));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(ScanError::ModelFitFailure("non-finite coefficients".to_string()));
    }

    Ok(LinearFit { slope, intercept })
}

fn percent_change(predicted: f64, current: f64) -> Result<f64, ScanError> {
    if current <= 0.0 || !predicted.is_finite() {
        return Err(ScanError::ModelFitFailure(format!(
            "cannot compare prediction {} against price {}",
            predicted, current
        )));
    }
    Ok((predicted - current) / current * 100.0)
}

/// Lag-1 autoregression: regress each close on the previous one and project the next bar.
#[derive(Debug, Clone)]
pub struct ShortHorizonRegressor {
    pub min_samples: usize,
}

impl Default for ShortHorizonRegressor {
    fn default() -> Self {
        Self { min_samples: 50 }
    }
}

impl ShortHorizonRegressor {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    pub fn forecast(&self, closes: &[f64]) -> Result<ShortHorizonForecast, ScanError> {
        let pairs = closes.len().saturating_sub(1);
        if pairs < self.min_samples {
            return Err(ScanError::InsufficientHistory {
                required: self.min_samples,
                available: pairs,
            });
        }

        let fit = ols(&closes[..pairs], &closes[1..])?;
        let current = closes[pairs];
        let predicted = fit.predict(current);
        let change = percent_change(predicted, current)?;

        Ok(ShortHorizonForecast {
            predicted_price: Some(predicted),
            percent_change: change,
            forecast_text: format!("projected change: {:+.2}%", change),
        })
    }
}

/// Straight-line projection of close against the bar index, roughly a month ahead.
#[derive(Debug, Clone)]
pub struct LongHorizonTrendExtrapolator {
    pub min_samples: usize,
    pub horizon_hours: u32,
    pub min_steps: usize,
}

impl Default for LongHorizonTrendExtrapolator {
    fn default() -> Self {
        Self {
            min_samples: 50,
            horizon_hours: 30 * 24,
            min_steps: 10,
        }
    }
}

impl LongHorizonTrendExtrapolator {
    /// Bars to extrapolate for the interval: `max(min_steps, horizon_hours / hours_per_bar)`
    pub fn steps(&self, interval: Interval) -> usize {
        let steps = (self.horizon_hours / interval.hours_per_bar()) as usize;
        steps.max(self.min_steps)
    }

    pub fn forecast(&self, series: &AnalyzedSeries, interval: Interval) -> Result<LongHorizonForecast, ScanError> {
        let closes = series.closes();
        if closes.len() < self.min_samples {
            return Err(ScanError::InsufficientHistory {
                required: self.min_samples,
                available: closes.len(),
            });
        }
        let last = series
            .latest()
            .ok_or_else(|| ScanError::DataUnavailable("empty series".to_string()))?;

        let index: Vec<f64> = (0..closes.len()).map(|i| i as f64).collect();
        let fit = ols(&index, &closes)?;

        let steps = self.steps(interval);
        let future_index = (closes.len() - 1 + steps) as f64;
        let predicted = fit.predict(future_index);
        let current = last.bar.close;
        let change = percent_change(predicted, current)?;

        Ok(LongHorizonForecast {
            predicted_price: Some(predicted),
            percent_change: change,
            forecast_timestamp: Some(last.bar.timestamp + Duration::hours(self.horizon_hours as i64)),
            steps: Some(steps),
            forecast_text: format!("projected change: {:+.2}%", change),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scanner_core::{AnalyzedBar, Bar, IndicatorSnapshot};

    fn analyzed(closes: &[f64]) -> AnalyzedSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        AnalyzedSeries {
            bars: closes
                .iter()
                .enumerate()
                .map(|(i, &close)| AnalyzedBar {
                    bar: Bar {
                        timestamp: start + Duration::hours(i as i64),
                        open: close,
                        high: close,
                        low: close,
                        close,
                        volume: 1.0,
                    },
                    snapshot: IndicatorSnapshot { sma_20: close, rsi_14: Some(50.0) },
                })
                .collect(),
        }
    }

    #[test]
    fn test_ols_exact_line() {
        let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + 2.0 * x).collect();
        let fit = ols(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
        assert!((fit.predict(10.0) - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_ols_degenerate_predictor() {
        let xs = vec![5.0; 10];
        let mut ys = vec![1.0; 10];
        ys[9] = 2.0;
        assert!(matches!(ols(&xs, &ys), Err(ScanError::ModelFitFailure(_))));
    }

    #[test]
    fn test_ols_rejects_bad_input() {
        assert!(matches!(ols(&[1.0], &[1.0]), Err(ScanError::InsufficientHistory { .. })));
        assert!(ols(&[1.0, 2.0], &[1.0]).is_err());
        assert!(ols(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_short_horizon_constant_series() {
        let closes = vec![250.0; 81];
        let forecast = ShortHorizonRegressor::default().forecast(&closes).unwrap();
        assert_eq!(forecast.percent_change, 0.0);
        assert_eq!(forecast.predicted_price, Some(250.0));
    }

    #[test]
    fn test_short_horizon_geometric_growth() {
        // close[t] = 1.01 * close[t-1] is recovered exactly
        let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let forecast = ShortHorizonRegressor::default().forecast(&closes).unwrap();
        assert!((forecast.percent_change - 1.0).abs() < 1e-6);
        assert!(forecast.forecast_text.starts_with("projected change: +1.00"));
    }

    #[test]
    fn test_short_horizon_minimum_samples() {
        let regressor = ShortHorizonRegressor::default();
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        // 50 closes → 49 lagged pairs
        match regressor.forecast(&closes) {
            Err(ScanError::InsufficientHistory { required, available }) => {
                assert_eq!(required, 50);
                assert_eq!(available, 49);
            }
            other => panic!("expected insufficient history, got {:?}", other),
        }

        let closes: Vec<f64> = (0..51).map(|i| 100.0 + (i % 7) as f64).collect();
        assert!(regressor.forecast(&closes).is_ok());
        assert!(ShortHorizonRegressor::new(10).forecast(&closes[..11]).is_ok());
    }

    #[test]
    fn test_long_horizon_steps() {
        let extrapolator = LongHorizonTrendExtrapolator::default();
        assert_eq!(extrapolator.steps(Interval::Hour1), 720);
        assert_eq!(extrapolator.steps(Interval::Hour4), 180);
        assert_eq!(extrapolator.steps(Interval::Day1), 30);

        let short_horizon = LongHorizonTrendExtrapolator { horizon_hours: 48, ..Default::default() };
        assert_eq!(short_horizon.steps(Interval::Day1), 10);
    }

    #[test]
    fn test_long_horizon_linear_trend() {
        let closes: Vec<f64> = (0..81).map(|i| 100.0 + i as f64).collect();
        let series = analyzed(&closes);
        let forecast = LongHorizonTrendExtrapolator::default()
            .forecast(&series, Interval::Day1)
            .unwrap();

        // 180 + 30 steps ahead along slope 1
        let predicted = forecast.predicted_price.unwrap();
        assert!((predicted - 210.0).abs() < 1e-6);
        assert!((forecast.percent_change - (210.0 - 180.0) / 180.0 * 100.0).abs() < 1e-6);
        assert_eq!(forecast.steps, Some(30));
    }

    #[test]
    fn test_long_horizon_timestamp_is_720_hours_ahead() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i % 5) as f64).collect();
        let series = analyzed(&closes);
        let last_ts = series.latest().unwrap().bar.timestamp;

        for interval in [Interval::Hour1, Interval::Hour4, Interval::Day1] {
            let forecast = LongHorizonTrendExtrapolator::default().forecast(&series, interval).unwrap();
            assert_eq!(forecast.forecast_timestamp, Some(last_ts + Duration::hours(720)));
        }
    }

    #[test]
    fn test_long_horizon_insufficient() {
        let series = analyzed(&[1.0, 2.0, 3.0]);
        assert!(LongHorizonTrendExtrapolator::default()
            .forecast(&series, Interval::Hour4)
            .is_err());
    }
}
