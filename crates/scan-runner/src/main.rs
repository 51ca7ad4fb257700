use anyhow::{Context, Result};
use binance_client::BinanceClient;
use scan_orchestrator::ScanOrchestrator;
use scanner_core::ScanError;

mod config;

use config::RunnerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // Logs go to stderr; stdout carries the report
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    tracing::info!("Starting crypto market scanner");

    let config = RunnerConfig::from_env()?;
    tracing::info!("Configuration loaded and validated");
    tracing::info!("  Provider: {} ({} req/min)", config.binance_base_url, config.binance_rate_limit);
    tracing::info!(
        "  Universe: top {} {} pairs + {} mandatory",
        config.request.limit_symbols,
        config.scanner.quote_asset,
        config.scanner.mandatory_symbols.len()
    );
    tracing::info!("  Interval: {}, top_n: {}", config.request.interval, config.request.top_n);
    tracing::info!(
        "  Workers: {} (timeout {}s per symbol)",
        config.scanner.concurrency,
        config.scanner.symbol_timeout_secs
    );
    if config.scanner.include_sentiment_in_score {
        tracing::warn!("Simulated sentiment is folded into scores");
    }
    tracing::debug!("Full configuration: {}", serde_json::to_string(&config)?);

    let client = BinanceClient::new(config.binance_base_url.clone(), config.binance_rate_limit);
    let orchestrator =
        ScanOrchestrator::new(config.scanner.clone(), client).context("Failed to build scan orchestrator")?;

    let outcome = match orchestrator.scan(config.request).await {
        Ok(outcome) => outcome,
        Err(ScanError::NoData) => {
            tracing::error!("Scan produced no usable market data");
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("Scan failed"),
    };

    tracing::info!("Top of the ranked universe ({} with data):", outcome.ranked.len());
    for (i, record) in outcome.ranking(10).iter().enumerate() {
        tracing::info!("  #{:<2} {:<12} {:>4}  {}", i + 1, record.symbol, record.score, record.suggestion);
    }

    let report = outcome.to_report();
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
