// src/strategies/adaptive.rs
use crate::types::{StrategyThresholds, Trend};

/// Entry/exit distances for the current trend.
///
/// Rising markets get a narrow buy trigger and a wide sell target so the
/// position rides momentum; falling markets widen the buy trigger instead of
/// catching every tick of the drop.
pub fn adjust(trend: Trend) -> StrategyThresholds {
    match trend {
        Trend::SharpUp => StrategyThresholds {
            buy_drop_pct: 0.5,
            sell_rise_pct: 4.0,
        },
        Trend::SharpDown => StrategyThresholds {
            buy_drop_pct: 3.0,
            sell_rise_pct: 2.0,
        },
        Trend::Stabilized => StrategyThresholds {
            buy_drop_pct: 0.75,
            sell_rise_pct: 2.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_per_trend() {
        assert_eq!(
            adjust(Trend::SharpUp),
            StrategyThresholds {
                buy_drop_pct: 0.5,
                sell_rise_pct: 4.0
            }
        );
        assert_eq!(
            adjust(Trend::SharpDown),
            StrategyThresholds {
                buy_drop_pct: 3.0,
                sell_rise_pct: 2.0
            }
        );
        assert_eq!(
            adjust(Trend::Stabilized),
            StrategyThresholds {
                buy_drop_pct: 0.75,
                sell_rise_pct: 2.0
            }
        );
    }

    #[test]
    fn thresholds_are_always_positive() {
        for trend in [Trend::SharpUp, Trend::SharpDown, Trend::Stabilized] {
            let t = adjust(trend);
            assert!(t.buy_drop_pct > 0.0 && t.sell_rise_pct > 0.0);
        }
    }
}
