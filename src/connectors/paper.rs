// src/connectors/paper.rs
use crate::connectors::traits::ExecutionHandler;
use crate::error::BotResult;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// Accepts every signed order locally. Used when live trading is off.
#[derive(Debug, Default)]
pub struct PaperExecution;

impl PaperExecution {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionHandler for PaperExecution {
    async fn post_private(&self, path: &str, body: String, _signature: String) -> BotResult<Value> {
        let txid = format!("PAPER-{}", Uuid::new_v4());
        info!(path, %body, %txid, "Paper order accepted");

        Ok(json!({
            "error": [],
            "result": {
                "descr": { "order": body },
                "txid": [txid],
            }
        }))
    }
}
