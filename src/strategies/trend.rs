// src/strategies/trend.rs
use crate::error::{BotError, BotResult};
use crate::strategies::traits::TrendClassifier;
use crate::types::{PriceBar, Trend};
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

pub const DEFAULT_SHARP_UP_PCT: f64 = 3.0;
pub const DEFAULT_SHARP_DOWN_PCT: f64 = 3.0;

fn label(pct_change: f64, sharp_up_pct: f64, sharp_down_pct: f64) -> Trend {
    if pct_change >= sharp_up_pct {
        Trend::SharpUp
    } else if pct_change <= -sharp_down_pct {
        Trend::SharpDown
    } else {
        Trend::Stabilized
    }
}

/// Compares the two latest closes. Reacts to a single noisy bar.
#[derive(Debug, Clone, Copy)]
pub struct SingleStepClassifier {
    pub sharp_up_pct: f64,
    pub sharp_down_pct: f64,
}

impl Default for SingleStepClassifier {
    fn default() -> Self {
        Self {
            sharp_up_pct: DEFAULT_SHARP_UP_PCT,
            sharp_down_pct: DEFAULT_SHARP_DOWN_PCT,
        }
    }
}

impl SingleStepClassifier {
    pub fn new(sharp_up_pct: f64, sharp_down_pct: f64) -> Self {
        Self {
            sharp_up_pct,
            sharp_down_pct,
        }
    }
}

impl TrendClassifier for SingleStepClassifier {
    fn name(&self) -> &'static str {
        "single_step"
    }

    fn classify(&self, bars: &[PriceBar]) -> BotResult<Trend> {
        let [.., previous, latest] = bars else {
            return Err(BotError::InsufficientData {
                required: 2,
                available: bars.len(),
            });
        };

        if previous.close == 0.0 {
            return Err(BotError::InsufficientData {
                required: 2,
                available: 1,
            });
        }

        let pct_change = (latest.close - previous.close) * 100.0 / previous.close;
        Ok(label(pct_change, self.sharp_up_pct, self.sharp_down_pct))
    }
}

/// Percentage spread between a fast and a slow EMA over the whole history.
#[derive(Debug, Clone, Copy)]
pub struct EmaCrossClassifier {
    fast_period: usize,
    slow_period: usize,
    sharp_up_pct: f64,
    sharp_down_pct: f64,
}

impl EmaCrossClassifier {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        sharp_up_pct: f64,
        sharp_down_pct: f64,
    ) -> BotResult<Self> {
        if fast_period == 0 || fast_period >= slow_period {
            return Err(BotError::Configuration(format!(
                "EMA periods must satisfy 0 < fast < slow, got {fast_period}/{slow_period}"
            )));
        }
        Ok(Self {
            fast_period,
            slow_period,
            sharp_up_pct,
            sharp_down_pct,
        })
    }

    fn ema(period: usize, bars: &[PriceBar]) -> BotResult<f64> {
        let mut ema = ExponentialMovingAverage::new(period)
            .map_err(|e| BotError::Configuration(format!("EMA({period}): {e:?}")))?;
        Ok(bars.iter().fold(0.0, |_, bar| ema.next(bar.close)))
    }
}

impl TrendClassifier for EmaCrossClassifier {
    fn name(&self) -> &'static str {
        "ema_cross"
    }

    fn classify(&self, bars: &[PriceBar]) -> BotResult<Trend> {
        if bars.len() < 2 {
            return Err(BotError::InsufficientData {
                required: 2,
                available: bars.len(),
            });
        }

        let fast = Self::ema(self.fast_period, bars)?;
        let slow = Self::ema(self.slow_period, bars)?;
        if slow == 0.0 {
            return Err(BotError::InsufficientData {
                required: 2,
                available: bars.len(),
            });
        }

        let spread_pct = (fast - slow) * 100.0 / slow;
        Ok(label(spread_pct, self.sharp_up_pct, self.sharp_down_pct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(c, i as i64 * 60))
            .collect()
    }

    #[test]
    fn four_percent_rise_is_sharp_up() {
        let trend = SingleStepClassifier::default().classify(&bars(&[100.0, 104.0])).unwrap();
        assert_eq!(trend, Trend::SharpUp);
    }

    #[test]
    fn three_percent_drop_is_sharp_down() {
        let trend = SingleStepClassifier::default().classify(&bars(&[100.0, 97.0])).unwrap();
        assert_eq!(trend, Trend::SharpDown);
    }

    #[test]
    fn one_percent_rise_is_stabilized() {
        let trend = SingleStepClassifier::default().classify(&bars(&[100.0, 101.0])).unwrap();
        assert_eq!(trend, Trend::Stabilized);
    }

    #[test]
    fn only_last_two_bars_matter() {
        let trend = SingleStepClassifier::default()
            .classify(&bars(&[50.0, 200.0, 100.0, 100.5]))
            .unwrap();
        assert_eq!(trend, Trend::Stabilized);
    }

    #[test]
    fn custom_thresholds_apply() {
        let classifier = SingleStepClassifier::new(1.0, 5.0);
        assert_eq!(classifier.classify(&bars(&[100.0, 101.0])).unwrap(), Trend::SharpUp);
        assert_eq!(classifier.classify(&bars(&[100.0, 96.0])).unwrap(), Trend::Stabilized);
    }

    #[test]
    fn single_bar_is_insufficient() {
        let err = SingleStepClassifier::default().classify(&bars(&[100.0])).unwrap_err();
        assert!(matches!(
            err,
            BotError::InsufficientData {
                required: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn ema_cross_follows_a_steady_climb() {
        let climbing: Vec<f64> = (0..40).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let classifier = EmaCrossClassifier::new(3, 12, 3.0, 3.0).unwrap();
        assert_eq!(classifier.classify(&bars(&climbing)).unwrap(), Trend::SharpUp);

        let flat = vec![100.0; 40];
        assert_eq!(classifier.classify(&bars(&flat)).unwrap(), Trend::Stabilized);
    }

    #[test]
    fn ema_cross_follows_a_steady_fall() {
        let falling: Vec<f64> = (0..40).map(|i| 100.0 * 0.99f64.powi(i)).collect();
        let classifier = EmaCrossClassifier::new(3, 12, 3.0, 3.0).unwrap();
        assert_eq!(classifier.classify(&bars(&falling)).unwrap(), Trend::SharpDown);
    }

    #[test]
    fn ema_cross_rejects_inverted_periods() {
        assert!(EmaCrossClassifier::new(12, 3, 3.0, 3.0).is_err());
        assert!(EmaCrossClassifier::new(0, 3, 3.0, 3.0).is_err());
    }
}
