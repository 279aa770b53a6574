// src/core/engine.rs
use crate::connectors::traits::MarketDataSource;
use crate::core::dispatcher::OrderDispatcher;
use crate::core::position::{decide, Position, ReentryPolicy};
use crate::error::{BotError, BotResult};
use crate::indicators::IndicatorEngine;
use crate::strategies::adaptive::adjust;
use crate::types::{Action, IndicatorResult, StrategyThresholds};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub pair: String,
    pub trade_volume: Decimal,
    pub ohlc_interval_minutes: u32,
    pub poll_interval: Duration,
    pub cycle_timeout: Duration,
    pub reentry: ReentryPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Held,
    Executed { action: Action, txids: Vec<String> },
    /// The order failed and the position was left untouched.
    Rejected { action: Action, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub current_price: f64,
    pub indicators: IndicatorResult,
    pub thresholds: StrategyThresholds,
    pub outcome: CycleOutcome,
    pub position: Position,
}

pub struct TradingEngine {
    settings: EngineSettings,
    market: Arc<dyn MarketDataSource>,
    indicators: IndicatorEngine,
    dispatcher: OrderDispatcher,
    position: Position,
}

impl TradingEngine {
    pub fn new(
        settings: EngineSettings,
        market: Arc<dyn MarketDataSource>,
        indicators: IndicatorEngine,
        dispatcher: OrderDispatcher,
    ) -> Self {
        Self {
            settings,
            market,
            indicators,
            dispatcher,
            position: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// fetch -> indicators -> thresholds -> decision -> order -> commit.
    pub async fn run_cycle(&mut self) -> BotResult<CycleReport> {
        let snapshot = self
            .market
            .snapshot(&self.settings.pair, self.settings.ohlc_interval_minutes)
            .await?;
        let current_price = snapshot.current_price;

        let indicators = self.indicators.compute(&snapshot.bars)?;
        let thresholds = adjust(indicators.trend);

        info!(
            price = current_price,
            short_sma = indicators.short_sma,
            long_sma = indicators.long_sma,
            trend = ?indicators.trend,
            buy_drop_pct = thresholds.buy_drop_pct,
            sell_rise_pct = thresholds.sell_rise_pct,
            "Market evaluated"
        );

        let decision = decide(
            self.position,
            current_price,
            &indicators,
            &thresholds,
            self.settings.reentry,
        );

        let outcome = match decision.action.side() {
            None => {
                info!("No trade action required.");
                self.position = decision.next;
                CycleOutcome::Held
            }
            Some(side) => {
                info!("Signal detected: {:?} @ {}", decision.action, current_price);
                let result = self
                    .dispatcher
                    .dispatch(side, self.settings.trade_volume, current_price)
                    .await;

                if result.success {
                    self.position = decision.next;
                    CycleOutcome::Executed {
                        action: decision.action,
                        txids: result.txids(),
                    }
                } else {
                    let reason = result
                        .error_message
                        .unwrap_or_else(|| "order failed".to_string());
                    warn!(
                        "Order {:?} failed, keeping position {:?}: {}",
                        decision.action, self.position, reason
                    );
                    CycleOutcome::Rejected {
                        action: decision.action,
                        reason,
                    }
                }
            }
        };

        Ok(CycleReport {
            current_price,
            indicators,
            thresholds,
            outcome,
            position: self.position,
        })
    }

    /// Runs cycles on a fixed interval until `shutdown` resolves.
    ///
    /// A cycle is awaited before the next tick is taken, and late ticks are
    /// skipped, so two cycles never overlap.
    pub async fn run<F>(&mut self, shutdown: F) -> BotResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Engine starting... pair={} classifier={} interval={:?}",
            self.settings.pair,
            self.indicators.classifier_name(),
            self.settings.poll_interval
        );

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, final position {:?}", self.position);
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let span = info_span!("cycle", id = %Uuid::new_v4());
                    let cycle_timeout = self.settings.cycle_timeout;
                    let outcome = timeout(cycle_timeout, self.run_cycle())
                        .instrument(span.clone())
                        .await;

                    let _entered = span.enter();
                    match outcome {
                        Ok(Ok(report)) => info!(outcome = ?report.outcome, position = ?report.position, "Cycle complete"),
                        Ok(Err(e)) if e.is_fatal() => {
                            error!("Fatal Engine Error: {}", e);
                            return Err(e);
                        }
                        Ok(Err(BotError::InsufficientData { required, available })) => {
                            warn!(required, available, "Not enough history, skipping cycle");
                        }
                        Ok(Err(e)) => error!("Error in trading cycle: {}", e),
                        Err(_) => error!("Cycle exceeded {:?}, skipping", cycle_timeout),
                    }
                }
            }
        }
    }
}
