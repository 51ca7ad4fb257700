use crate::fetcher::MarketDataFetcher;
use crate::report::{aggregate, ScanOutcome};
use crate::selection::{rank, SelectionPolicy};
use crate::universe::SymbolUniverseSelector;
use chrono::Utc;
use forecast_ensemble::ForecastEnsemble;
use scanner_core::{
    AnalyzedSeries, Interval, MarketDataSource, ScanError, ScanRequest, ScannerConfig, ScoreRecord,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use technical_analysis::{IndicatorEngine, ScoringEngine};
use tokio::sync::Semaphore;

/// Scoring-pass output for one symbol. The analyzed series is kept for the forecast pass.
#[derive(Debug, Clone)]
pub struct SymbolScan {
    pub record: ScoreRecord,
    pub series: Option<AnalyzedSeries>,
}

impl SymbolScan {
    fn insufficient(symbol: &str) -> Self {
        Self {
            record: ScoreRecord::insufficient(symbol),
            series: None,
        }
    }
}

pub struct ScanPipeline {
    config: ScannerConfig,
    fetcher: MarketDataFetcher,
    universe: SymbolUniverseSelector,
    indicators: IndicatorEngine,
    scoring: ScoringEngine,
    selection: SelectionPolicy,
    ensemble: ForecastEnsemble,
}

impl ScanPipeline {
    pub fn new(config: ScannerConfig, source: Arc<dyn MarketDataSource>) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            fetcher: MarketDataFetcher::new(source, config.window_size),
            universe: SymbolUniverseSelector::from_config(&config),
            indicators: IndicatorEngine::new(config.scoring.min_valid_bars),
            scoring: ScoringEngine::new(config.scoring.clone()),
            selection: SelectionPolicy::new(config.mandatory_symbols.clone()),
            ensemble: ForecastEnsemble::new(&config.forecast),
            config,
        })
    }

    /// Fetch, analyze and score one symbol. Never fails: problems become a sentinel record.
    pub async fn scan_symbol(&self, symbol: &str, interval: Interval) -> SymbolScan {
        let series = self.fetcher.fetch(symbol, interval).await;

        let analyzed = match self.indicators.analyze(&series) {
            Ok(analyzed) => analyzed,
            Err(e) => {
                tracing::debug!("{} has no usable history: {}", symbol, e);
                return SymbolScan::insufficient(symbol);
            }
        };

        let record = if self.config.include_sentiment_in_score {
            let sentiment = self.ensemble.simulate_sentiment(symbol);
            self.scoring.score_with_sentiment(
                symbol,
                &analyzed,
                sentiment.direction,
                self.config.sentiment_score_bonus,
            )
        } else {
            self.scoring.score(symbol, &analyzed)
        };

        SymbolScan {
            record,
            series: Some(analyzed),
        }
    }

    /// Score every symbol on the bounded worker pool. Output follows input order.
    pub async fn score_universe(self: &Arc<Self>, symbols: &[String], interval: Interval) -> Vec<SymbolScan> {
        let total = symbols.len();
        let timeout = self.config.symbol_timeout();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(total);

        for symbol in symbols {
            let pipeline = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let task_symbol = symbol.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return SymbolScan::insufficient(&task_symbol),
                };

                // The clock starts once a worker slot is held
                let scan = match tokio::time::timeout(timeout, pipeline.scan_symbol(&task_symbol, interval)).await {
                    Ok(scan) => scan,
                    Err(_) => {
                        tracing::warn!("Scoring {} timed out after {:?}", task_symbol, timeout);
                        SymbolScan::insufficient(&task_symbol)
                    }
                };

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(
                    "[{}/{}] {} => {} ({})",
                    done,
                    total,
                    task_symbol,
                    scan.record.score,
                    scan.record.suggestion
                );
                scan
            });

            handles.push((symbol.clone(), handle));
        }

        let mut scans = Vec::with_capacity(total);
        for (symbol, handle) in handles {
            match handle.await {
                Ok(scan) => scans.push(scan),
                Err(e) => {
                    tracing::warn!("Scoring task for {} failed: {}", symbol, e);
                    scans.push(SymbolScan::insufficient(&symbol));
                }
            }
        }
        scans
    }

    /// One uncached scan: universe, scoring, ranking, selection, forecasts.
    pub async fn run(self: &Arc<Self>, request: ScanRequest) -> Result<ScanOutcome, ScanError> {
        let started = std::time::Instant::now();
        tracing::info!(
            "Starting scan (limit_symbols: {}, top_n: {}, interval: {})",
            request.limit_symbols,
            request.top_n,
            request.interval
        );

        let symbols = self
            .universe
            .build(self.fetcher.source(), request.limit_symbols)
            .await;
        let scans = self.score_universe(&symbols, request.interval).await;

        let records: Vec<ScoreRecord> = scans.iter().map(|s| s.record.clone()).collect();
        let ranked = rank(&records);
        tracing::info!(
            "Scored {} symbols, {} with sufficient data",
            records.len(),
            ranked.len()
        );

        let selected = self.selection.select(&ranked, &records, request.top_n);
        if selected.iter().all(|r| r.is_sentinel()) {
            tracing::warn!("No symbol in the selection has usable market data");
            return Err(ScanError::NoData);
        }

        tracing::info!("Running forecast ensemble on {} symbols", selected.len());
        let series_by_symbol: HashMap<&str, &AnalyzedSeries> = scans
            .iter()
            .filter_map(|s| s.series.as_ref().map(|series| (s.record.symbol.as_str(), series)))
            .collect();

        let results = selected
            .into_iter()
            .map(|record| {
                let series = series_by_symbol.get(record.symbol.as_str()).copied();
                let forecasts = self.ensemble.forecast(&record.symbol, series, request.interval);
                aggregate(record, forecasts)
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Scan complete: {} results from {} symbols in {:.1}s",
            results.len(),
            symbols.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(ScanOutcome {
            request,
            generated_at: Utc::now(),
            scanned: symbols.len(),
            ranked,
            results,
        })
    }
}
