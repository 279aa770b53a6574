// src/types.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Value of the `type` field on Kraken's AddOrder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        }
    }
}

/// One OHLC interval. Only `close` feeds the indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub timestamp: i64,
}

impl PriceBar {
    /// Flat bar where every price equals `close`.
    pub fn from_close(close: f64, timestamp: i64) -> Self {
        Self {
            open: close,
            high: close,
            low: close,
            close,
            timestamp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub current_price: f64,
    pub bars: Vec<PriceBar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    SharpUp,
    SharpDown,
    Stabilized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorResult {
    pub short_sma: f64,
    pub long_sma: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyThresholds {
    pub buy_drop_pct: f64,
    pub sell_rise_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn side(&self) -> Option<Side> {
        match self {
            Action::Buy => Some(Side::Buy),
            Action::Sell => Some(Side::Sell),
            Action::Hold => None,
        }
    }
}

/// An AddOrder request. Market orders never carry a price, limit orders always do.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderRequest {
    Market {
        nonce: u64,
        pair: String,
        side: Side,
        volume: Decimal,
    },
    Limit {
        nonce: u64,
        pair: String,
        side: Side,
        volume: Decimal,
        price: Decimal,
    },
}

impl OrderRequest {
    pub fn nonce(&self) -> u64 {
        match self {
            OrderRequest::Market { nonce, .. } | OrderRequest::Limit { nonce, .. } => *nonce,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            OrderRequest::Market { side, .. } | OrderRequest::Limit { side, .. } => *side,
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self {
            OrderRequest::Market { .. } => OrderType::Market,
            OrderRequest::Limit { .. } => OrderType::Limit,
        }
    }

    /// Form-encoded body in Kraken's field order: nonce, pair, type, ordertype, volume[, price].
    pub fn to_form_body(&self) -> Result<String, serde_urlencoded::ser::Error> {
        let mut params: Vec<(&str, String)> = match self {
            OrderRequest::Market {
                nonce,
                pair,
                side,
                volume,
            }
            | OrderRequest::Limit {
                nonce,
                pair,
                side,
                volume,
                ..
            } => vec![
                ("nonce", nonce.to_string()),
                ("pair", pair.clone()),
                ("type", side.as_str().to_string()),
                ("ordertype", self.order_type().as_str().to_string()),
                ("volume", volume.normalize().to_string()),
            ],
        };

        if let OrderRequest::Limit { price, .. } = self {
            params.push(("price", price.normalize().to_string()));
        }

        serde_urlencoded::to_string(&params)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub success: bool,
    pub exchange_response: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

impl OrderResult {
    pub fn accepted(response: serde_json::Value) -> Self {
        Self {
            success: true,
            exchange_response: Some(response),
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>, response: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            exchange_response: response,
            error_message: Some(message.into()),
        }
    }

    /// Transaction ids from `result.txid`, empty if the exchange sent none.
    pub fn txids(&self) -> Vec<String> {
        self.exchange_response
            .as_ref()
            .and_then(|r| r.pointer("/result/txid"))
            .and_then(|v| v.as_array())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
