// src/connectors/kraken.rs
use crate::connectors::messages::{
    parse_ohlc_rows, select_pair, KrakenEnvelope, TickerResult,
};
use crate::connectors::traits::{ExecutionHandler, MarketDataSource};
use crate::error::{BotError, BotResult};
use crate::types::PriceBar;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";
pub const TICKER_PATH: &str = "/0/public/Ticker";
pub const OHLC_PATH: &str = "/0/public/OHLC";
pub const ADD_ORDER_PATH: &str = "/0/private/AddOrder";

pub struct KrakenClient {
    api_key: String,
    http_client: Client,
    base_url: Url,
}

impl KrakenClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> BotResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kraken_swing/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BotError::Configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            http_client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> BotResult<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_public<T: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> BotResult<T> {
        let url = self.endpoint(path, query)?;
        debug!(%url, "GET");

        let envelope = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<KrakenEnvelope<T>>()
            .await?;

        envelope.into_result()
    }
}

#[async_trait]
impl MarketDataSource for KrakenClient {
    async fn fetch_price(&self, pair: &str) -> BotResult<f64> {
        let result: TickerResult = self.get_public(TICKER_PATH, &[("pair", pair)]).await?;
        select_pair(&result, pair)?.last_trade_price()
    }

    async fn fetch_bars(&self, pair: &str, interval_minutes: u32) -> BotResult<Vec<PriceBar>> {
        let interval = interval_minutes.to_string();
        let result: HashMap<String, Value> = self
            .get_public(OHLC_PATH, &[("pair", pair), ("interval", interval.as_str())])
            .await?;

        let bars = parse_ohlc_rows(select_pair(&result, pair)?)?;
        debug!(pair, count = bars.len(), "fetched OHLC bars");
        Ok(bars)
    }
}

#[async_trait]
impl ExecutionHandler for KrakenClient {
    async fn post_private(&self, path: &str, body: String, signature: String) -> BotResult<Value> {
        let url = self.endpoint(path, &[])?;
        info!(%url, "POST private request");

        // Kraken reports order errors inside a 200 body, so the status check only
        // catches gateway-level failures.
        let response = self
            .http_client
            .post(url)
            .header("API-Key", &self.api_key)
            .header("API-Sign", signature)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }
}
