// src/main.rs
use anyhow::Context;
use dotenvy::dotenv;
use kraken_swing::config::{AppConfig, ClassifierKind};
use kraken_swing::connectors::kraken::KrakenClient;
use kraken_swing::connectors::paper::PaperExecution;
use kraken_swing::connectors::signer::RequestSigner;
use kraken_swing::connectors::traits::{ExecutionHandler, MarketDataSource};
use kraken_swing::core::dispatcher::{DispatchSettings, OrderDispatcher};
use kraken_swing::core::engine::{EngineSettings, TradingEngine};
use kraken_swing::indicators::IndicatorEngine;
use kraken_swing::logging::init_logging;
use kraken_swing::strategies::traits::TrendClassifier;
use kraken_swing::strategies::trend::{EmaCrossClassifier, SingleStepClassifier};
use std::sync::Arc;
use tracing::{error, info};

// Paper mode still signs orders, so it needs some key to sign with.
const PAPER_SECRET: &str = "cGFwZXItdHJhZGluZw==";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new().context("loading configuration")?;
    let _log_guard = init_logging(&config.logging);

    println!("========================================");
    println!("       KRAKEN SWING - v{}", env!("CARGO_PKG_VERSION"));
    println!("========================================");
    println!("Target: {}", config.pair);
    println!(
        "Mode:   {}",
        if config.live_trading {
            "🚨 LIVE TRADING"
        } else {
            "📝 PAPER TRADING"
        }
    );
    println!("========================================");

    // 2. Initialize Components
    let client = Arc::new(KrakenClient::new(
        config.api_key.clone(),
        &config.base_url,
        config.request_timeout(),
    )?);

    let execution_handler: Arc<dyn ExecutionHandler> = if config.live_trading {
        client.clone()
    } else {
        Arc::new(PaperExecution::new())
    };
    let secret = if !config.live_trading && config.api_secret.is_empty() {
        PAPER_SECRET
    } else {
        config.api_secret.as_str()
    };
    let signer = RequestSigner::from_base64(secret)?;

    let strategy = &config.strategy;
    let classifier: Box<dyn TrendClassifier> = match strategy.classifier {
        ClassifierKind::SingleStep => Box::new(SingleStepClassifier::new(
            strategy.sharp_up_pct,
            strategy.sharp_down_pct,
        )),
        ClassifierKind::EmaCross => Box::new(EmaCrossClassifier::new(
            strategy.short_period,
            strategy.long_period,
            strategy.sharp_up_pct,
            strategy.sharp_down_pct,
        )?),
    };

    let dispatcher = OrderDispatcher::new(
        DispatchSettings {
            pair: config.pair.clone(),
            order_type: config.order.order_type,
            limit_slippage_pct: config.order.limit_slippage_pct,
            tick_size: config.order.tick_size,
        },
        signer,
        execution_handler,
    );

    let market: Arc<dyn MarketDataSource> = client;
    let mut engine = TradingEngine::new(
        EngineSettings {
            pair: config.pair.clone(),
            trade_volume: config.trade_volume,
            ohlc_interval_minutes: strategy.ohlc_interval_minutes,
            poll_interval: config.poll_interval(),
            cycle_timeout: config.cycle_timeout(),
            reentry: strategy.reentry,
        },
        market,
        IndicatorEngine::new(strategy.short_period, strategy.long_period, classifier),
        dispatcher,
    );

    // 3. Run Engine until Ctrl+C
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = engine.run(shutdown).await {
        error!("Fatal Engine Error: {}", e);
        return Err(e.into());
    }

    info!("Stopped cleanly");
    Ok(())
}
