// src/core/dispatcher.rs
use crate::connectors::kraken::ADD_ORDER_PATH;
use crate::connectors::messages::KrakenEnvelope;
use crate::connectors::signer::RequestSigner;
use crate::connectors::traits::ExecutionHandler;
use crate::types::{OrderRequest, OrderResult, OrderType, Side};
use crate::utils::nonce::NonceGenerator;
use crate::utils::precision::limit_price;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub pair: String,
    pub order_type: OrderType,
    pub limit_slippage_pct: Decimal,
    pub tick_size: Decimal,
}

/// Signs and submits AddOrder requests. Owns the process nonce counter.
pub struct OrderDispatcher {
    settings: DispatchSettings,
    signer: RequestSigner,
    nonces: NonceGenerator,
    execution_handler: Arc<dyn ExecutionHandler>,
}

impl OrderDispatcher {
    pub fn new(
        settings: DispatchSettings,
        signer: RequestSigner,
        execution_handler: Arc<dyn ExecutionHandler>,
    ) -> Self {
        Self {
            settings,
            signer,
            nonces: NonceGenerator::new(),
            execution_handler,
        }
    }

    pub fn last_nonce(&self) -> u64 {
        self.nonces.last_issued()
    }

    fn build_request(&mut self, side: Side, volume: Decimal, reference_price: f64) -> Option<OrderRequest> {
        let nonce = self.nonces.next();
        let pair = self.settings.pair.clone();

        match self.settings.order_type {
            OrderType::Market => Some(OrderRequest::Market {
                nonce,
                pair,
                side,
                volume,
            }),
            OrderType::Limit => {
                let price = limit_price(
                    reference_price,
                    side,
                    self.settings.limit_slippage_pct,
                    self.settings.tick_size,
                )?;
                Some(OrderRequest::Limit {
                    nonce,
                    pair,
                    side,
                    volume,
                    price,
                })
            }
        }
    }

    /// One signed AddOrder. Never returns an error: every failure lands in `OrderResult`.
    pub async fn dispatch(&mut self, side: Side, volume: Decimal, reference_price: f64) -> OrderResult {
        let Some(request) = self.build_request(side, volume, reference_price) else {
            return OrderResult::failed(
                format!("cannot derive limit price from {reference_price}"),
                None,
            );
        };

        let body = match request.to_form_body() {
            Ok(body) => body,
            Err(e) => return OrderResult::failed(format!("cannot encode order: {e}"), None),
        };
        let signature = self.signer.sign(ADD_ORDER_PATH, request.nonce(), &body);

        info!(
            "🚀 Sending Order: {} {} {} ({}) nonce={}",
            side.as_str(),
            volume,
            self.settings.pair,
            request.order_type().as_str(),
            request.nonce()
        );

        match self
            .execution_handler
            .post_private(ADD_ORDER_PATH, body, signature)
            .await
        {
            Ok(response) => interpret(response),
            Err(e) => {
                error!("⚠️ Execution Error: {}", e);
                OrderResult::failed(e.to_string(), None)
            }
        }
    }
}

fn interpret(response: Value) -> OrderResult {
    match serde_json::from_value::<KrakenEnvelope<Value>>(response.clone()) {
        Ok(envelope) => match envelope.into_result() {
            Ok(_) => {
                let result = OrderResult::accepted(response);
                info!("✅ Order accepted: txid={:?}", result.txids());
                result
            }
            Err(e) => {
                warn!("Order rejected: {}", e);
                OrderResult::failed(e.to_string(), Some(response))
            }
        },
        Err(e) => OrderResult::failed(format!("unreadable AddOrder response: {e}"), Some(response)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BotError, BotResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Mutex;

    const SECRET: &str =
        "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

    struct Recorder {
        reply: Mutex<Option<BotResult<Value>>>,
        seen: Mutex<Vec<(String, String, String)>>,
    }

    impl Recorder {
        fn replying(reply: BotResult<Value>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ExecutionHandler for Recorder {
        async fn post_private(&self, path: &str, body: String, signature: String) -> BotResult<Value> {
            self.seen
                .lock()
                .unwrap()
                .push((path.to_string(), body, signature));
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(json!({ "error": [], "result": {} })))
        }
    }

    fn dispatcher(order_type: OrderType, handler: Arc<Recorder>) -> OrderDispatcher {
        OrderDispatcher::new(
            DispatchSettings {
                pair: "XXRPZUSD".into(),
                order_type,
                limit_slippage_pct: Decimal::from_str("0.1").unwrap(),
                tick_size: Decimal::from_str("0.00001").unwrap(),
            },
            RequestSigner::from_base64(SECRET).unwrap(),
            handler,
        )
    }

    #[tokio::test]
    async fn market_order_is_signed_and_accepted() {
        let handler = Recorder::replying(Ok(json!({
            "error": [],
            "result": { "descr": { "order": "buy 15.00000000 XRPUSD @ market" }, "txid": ["OABC12-DEF34-GHI56"] }
        })));
        let mut d = dispatcher(OrderType::Market, handler.clone());

        let result = d.dispatch(Side::Buy, Decimal::from(15), 0.5).await;
        assert!(result.success);
        assert_eq!(result.txids(), vec!["OABC12-DEF34-GHI56".to_string()]);

        let seen = handler.seen.lock().unwrap();
        let (path, body, signature) = &seen[0];
        assert_eq!(path, ADD_ORDER_PATH);
        let nonce = d.last_nonce();
        assert_eq!(
            body,
            &format!("nonce={nonce}&pair=XXRPZUSD&type=buy&ordertype=market&volume=15")
        );
        let expected = RequestSigner::from_base64(SECRET)
            .unwrap()
            .sign(ADD_ORDER_PATH, nonce, body);
        assert_eq!(signature, &expected);
    }

    #[tokio::test]
    async fn limit_order_carries_slipped_price() {
        let handler = Recorder::replying(Ok(json!({ "error": [], "result": { "txid": ["X"] } })));
        let mut d = dispatcher(OrderType::Limit, handler.clone());

        assert!(d.dispatch(Side::Sell, Decimal::from(15), 0.5).await.success);

        let seen = handler.seen.lock().unwrap();
        assert!(seen[0].1.ends_with("&ordertype=limit&volume=15&price=0.4995"));
    }

    #[tokio::test]
    async fn error_array_is_a_failed_result() {
        let handler = Recorder::replying(Ok(json!({ "error": ["EOrder:Insufficient funds"] })));
        let mut d = dispatcher(OrderType::Market, handler);

        let result = d.dispatch(Side::Buy, Decimal::from(15), 0.5).await;
        assert!(!result.success);
        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("EOrder:Insufficient funds"));
        assert!(result.exchange_response.is_some());
    }

    #[tokio::test]
    async fn transport_error_is_a_failed_result() {
        let handler = Recorder::replying(Err(BotError::Transport("connection reset".into())));
        let mut d = dispatcher(OrderType::Market, handler);

        let result = d.dispatch(Side::Sell, Decimal::from(15), 0.5).await;
        assert!(!result.success);
        assert_eq!(
            result.error_message.as_deref(),
            Some("transport error: connection reset")
        );
    }

    #[tokio::test]
    async fn each_dispatch_uses_a_fresh_nonce() {
        let handler = Recorder::replying(Ok(json!({ "error": [], "result": {} })));
        let mut d = dispatcher(OrderType::Market, handler.clone());

        d.dispatch(Side::Buy, Decimal::from(1), 0.5).await;
        d.dispatch(Side::Buy, Decimal::from(1), 0.5).await;
        d.dispatch(Side::Sell, Decimal::from(1), 0.5).await;

        let seen = handler.seen.lock().unwrap();
        let nonces: Vec<u64> = seen
            .iter()
            .map(|(_, body, _)| {
                body.split('&').next().unwrap()["nonce=".len()..].parse().unwrap()
            })
            .collect();
        assert_eq!(nonces.len(), 3);
        assert!(nonces.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn unusable_reference_price_fails_limit_order() {
        let handler = Recorder::replying(Ok(json!({ "error": [], "result": {} })));
        let mut d = dispatcher(OrderType::Limit, handler.clone());

        let result = d.dispatch(Side::Buy, Decimal::from(1), f64::INFINITY).await;
        assert!(!result.success);
        assert!(handler.seen.lock().unwrap().is_empty());
    }
}
