// src/strategies/traits.rs
use crate::error::BotResult;
use crate::types::{PriceBar, Trend};

/// Turns recent bars into a trend label. Implementations must not keep state
/// between calls; every cycle passes the full history it has.
pub trait TrendClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify(&self, bars: &[PriceBar]) -> BotResult<Trend>;
}
