//! Single-pair Kraken swing trader: SMA/trend driven thresholds, one position,
//! signed market or limit orders.

pub mod config;
pub mod connectors;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod strategies;
pub mod types;
pub mod utils;

pub use error::{BotError, BotResult};
