// src/core/position.rs
use crate::types::{Action, IndicatorResult, StrategyThresholds};
use serde::Deserialize;

/// The only state that outlives a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// No coins held. `last_exit` is the price of the most recent sell, if any.
    Flat { last_exit: Option<f64> },
    Holding { entry_price: f64 },
}

impl Default for Position {
    fn default() -> Self {
        Position::Flat { last_exit: None }
    }
}

impl Position {
    pub fn held(&self) -> bool {
        matches!(self, Position::Holding { .. })
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            Position::Holding { entry_price } => Some(*entry_price),
            Position::Flat { .. } => None,
        }
    }
}

/// How a Flat position that has already traded gets back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Buy again on the next cycle after any sell.
    Bootstrap,
    /// Buy only after a drop of `buy_drop_pct` below the exit price with short SMA under long SMA.
    #[default]
    WaitForDrop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub next: Position,
}

impl Decision {
    fn hold(current: Position) -> Self {
        Self {
            action: Action::Hold,
            next: current,
        }
    }

    fn buy(price: f64) -> Self {
        Self {
            action: Action::Buy,
            next: Position::Holding { entry_price: price },
        }
    }
}

/// Pure transition function. The caller commits `next` only once the order went through.
pub fn decide(
    state: Position,
    current_price: f64,
    indicators: &IndicatorResult,
    thresholds: &StrategyThresholds,
    reentry: ReentryPolicy,
) -> Decision {
    let downtrend = indicators.short_sma < indicators.long_sma;
    let uptrend = indicators.short_sma > indicators.long_sma;

    match state {
        Position::Flat { last_exit: None } => Decision::buy(current_price),
        Position::Flat {
            last_exit: Some(exit_price),
        } => match reentry {
            ReentryPolicy::Bootstrap => Decision::buy(current_price),
            ReentryPolicy::WaitForDrop => {
                let reentry_threshold = exit_price * (1.0 - thresholds.buy_drop_pct / 100.0);
                if current_price <= reentry_threshold && downtrend {
                    Decision::buy(current_price)
                } else {
                    Decision::hold(state)
                }
            }
        },
        Position::Holding { entry_price } => {
            let buy_threshold = entry_price * (1.0 - thresholds.buy_drop_pct / 100.0);
            let sell_threshold = entry_price * (1.0 + thresholds.sell_rise_pct / 100.0);

            if current_price <= buy_threshold && downtrend {
                // average down: the new fill replaces the entry price
                Decision::buy(current_price)
            } else if current_price >= sell_threshold && uptrend {
                Decision {
                    action: Action::Sell,
                    next: Position::Flat {
                        last_exit: Some(current_price),
                    },
                }
            } else {
                Decision::hold(state)
            }
        }
    }
}
