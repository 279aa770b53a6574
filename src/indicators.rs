// src/indicators.rs
use crate::error::{BotError, BotResult};
use crate::strategies::traits::TrendClassifier;
use crate::strategies::trend::SingleStepClassifier;
use crate::types::{IndicatorResult, PriceBar};
use ta::indicators::SimpleMovingAverage;
use ta::Next;

/// Mean close of the last `period` bars. A shorter history averages what it has.
pub fn sma(bars: &[PriceBar], period: usize) -> BotResult<f64> {
    if bars.is_empty() {
        return Err(BotError::InsufficientData {
            required: period.max(1),
            available: 0,
        });
    }

    let mut average = SimpleMovingAverage::new(period)
        .map_err(|e| BotError::Configuration(format!("SMA({period}): {e:?}")))?;
    let window = &bars[bars.len().saturating_sub(period)..];
    Ok(window.iter().fold(0.0, |_, bar| average.next(bar.close)))
}

pub struct IndicatorEngine {
    short_period: usize,
    long_period: usize,
    classifier: Box<dyn TrendClassifier>,
}

impl IndicatorEngine {
    pub fn new(short_period: usize, long_period: usize, classifier: Box<dyn TrendClassifier>) -> Self {
        Self {
            short_period,
            long_period,
            classifier,
        }
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn compute(&self, bars: &[PriceBar]) -> BotResult<IndicatorResult> {
        Ok(IndicatorResult {
            short_sma: sma(bars, self.short_period)?,
            long_sma: sma(bars, self.long_period)?,
            trend: self.classifier.classify(bars)?,
        })
    }
}

/// SMAs plus the default single-step trend at 3%/3%.
pub fn compute_indicators(
    bars: &[PriceBar],
    short_period: usize,
    long_period: usize,
) -> BotResult<IndicatorResult> {
    IndicatorEngine::new(
        short_period,
        long_period,
        Box::new(SingleStepClassifier::default()),
    )
    .compute(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trend;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(c, i as i64 * 60))
            .collect()
    }

    #[test]
    fn sma_uses_most_recent_closes() {
        let history = bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sma(&history, 3).unwrap(), 4.0);
        assert_eq!(sma(&history, 5).unwrap(), 3.0);
        assert_eq!(sma(&history, 1).unwrap(), 5.0);
    }

    #[test]
    fn short_history_degrades_instead_of_failing() {
        let history = bars(&[2.0, 4.0]);
        assert_eq!(sma(&history, 10).unwrap(), 3.0);
    }

    #[test]
    fn empty_history_is_insufficient() {
        assert!(matches!(
            sma(&[], 3),
            Err(BotError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn zero_period_is_configuration_error() {
        assert!(matches!(
            sma(&bars(&[1.0]), 0),
            Err(BotError::Configuration(_))
        ));
    }

    #[test]
    fn compute_indicators_combines_smas_and_trend() {
        let result = compute_indicators(&bars(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3, 5).unwrap();
        assert_eq!(result.short_sma, 4.0);
        assert_eq!(result.long_sma, 3.0);
        // 4 -> 5 is +25%
        assert_eq!(result.trend, Trend::SharpUp);
    }

    #[test]
    fn one_bar_fails_on_trend() {
        assert!(matches!(
            compute_indicators(&bars(&[1.0]), 3, 5),
            Err(BotError::InsufficientData { required: 2, .. })
        ));
    }
}
