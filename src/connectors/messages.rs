// src/connectors/messages.rs
use crate::error::{BotError, BotResult};
use crate::types::PriceBar;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Every Kraken REST reply: `{ "error": [...], "result": {...} }`.
#[derive(Debug, Deserialize)]
pub struct KrakenEnvelope<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

impl<T> KrakenEnvelope<T> {
    /// Non-empty `error` is a rejection even when `result` is present.
    pub fn into_result(self) -> BotResult<T> {
        if !self.error.is_empty() {
            return Err(BotError::ExchangeRejection(self.error));
        }
        self.result
            .ok_or_else(|| BotError::MalformedResponse("response has no result".into()))
    }
}

/// Entry of /public/Ticker. `c` is [last trade price, lot volume].
#[derive(Debug, Deserialize)]
pub struct TickerInfo {
    pub c: Vec<String>,
}

impl TickerInfo {
    pub fn last_trade_price(&self) -> BotResult<f64> {
        let raw = self
            .c
            .first()
            .ok_or_else(|| BotError::MalformedResponse("ticker has no last trade".into()))?;
        parse_price(raw)
    }
}

pub type TickerResult = HashMap<String, TickerInfo>;

/// Picks the entry for `pair`, or the only entry when Kraken answered under its alt name.
pub fn select_pair<'a, T>(result: &'a HashMap<String, T>, pair: &str) -> BotResult<&'a T> {
    if let Some(entry) = result.get(pair) {
        return Ok(entry);
    }
    let mut entries = result.iter().filter(|(key, _)| key.as_str() != "last");
    match (entries.next(), entries.next()) {
        (Some((_, entry)), None) => Ok(entry),
        _ => Err(BotError::MalformedResponse(format!(
            "pair {pair} missing from response"
        ))),
    }
}

/// Rows of /public/OHLC: [time, open, high, low, close, vwap, volume, count].
/// Prices arrive as strings, time as an integer.
pub fn parse_ohlc_rows(rows: &Value) -> BotResult<Vec<PriceBar>> {
    let rows = rows
        .as_array()
        .ok_or_else(|| BotError::MalformedResponse("OHLC rows are not an array".into()))?;

    rows.iter()
        .map(|row| {
            let row = row
                .as_array()
                .filter(|cells| cells.len() >= 5)
                .ok_or_else(|| BotError::MalformedResponse(format!("bad OHLC row: {row}")))?;
            Ok(PriceBar {
                timestamp: row[0]
                    .as_i64()
                    .ok_or_else(|| BotError::MalformedResponse("OHLC time is not an integer".into()))?,
                open: cell_price(&row[1])?,
                high: cell_price(&row[2])?,
                low: cell_price(&row[3])?,
                close: cell_price(&row[4])?,
            })
        })
        .collect()
}

fn cell_price(cell: &Value) -> BotResult<f64> {
    match cell {
        Value::String(s) => parse_price(s),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| BotError::MalformedResponse(format!("bad price {n}"))),
        other => Err(BotError::MalformedResponse(format!("bad price {other}"))),
    }
}

fn parse_price(raw: &str) -> BotResult<f64> {
    raw.parse::<f64>()
        .map_err(|_| BotError::MalformedResponse(format!("bad price {raw:?}")))
}
