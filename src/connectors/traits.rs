use crate::error::BotResult;
use crate::types::{MarketSnapshot, PriceBar};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Last trade price for `pair`.
    async fn fetch_price(&self, pair: &str) -> BotResult<f64>;

    /// OHLC history for `pair`, oldest first.
    async fn fetch_bars(&self, pair: &str, interval_minutes: u32) -> BotResult<Vec<PriceBar>>;

    async fn snapshot(&self, pair: &str, interval_minutes: u32) -> BotResult<MarketSnapshot> {
        let (current_price, bars) = tokio::try_join!(
            self.fetch_price(pair),
            self.fetch_bars(pair, interval_minutes)
        )?;
        Ok(MarketSnapshot {
            current_price,
            bars,
        })
    }
}

/// Submits an already signed private request and returns the raw JSON reply.
#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    async fn post_private(&self, path: &str, body: String, signature: String) -> BotResult<Value>;
}
