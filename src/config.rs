// src/config.rs

use crate::connectors::kraken::DEFAULT_BASE_URL;
use crate::connectors::signer::RequestSigner;
use crate::core::position::ReentryPolicy;
use crate::error::{BotError, BotResult};
use crate::types::OrderType;
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    SingleStep,
    EmaCross,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StrategyConfig {
    pub short_period: usize,
    pub long_period: usize,
    pub ohlc_interval_minutes: u32,
    pub sharp_up_pct: f64,
    pub sharp_down_pct: f64,
    pub classifier: ClassifierKind,
    pub reentry: ReentryPolicy,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 20,
            ohlc_interval_minutes: 1,
            sharp_up_pct: 3.0,
            sharp_down_pct: 3.0,
            classifier: ClassifierKind::SingleStep,
            reentry: ReentryPolicy::WaitForDrop,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OrderConfig {
    pub order_type: OrderType,
    pub limit_slippage_pct: Decimal,
    pub tick_size: Decimal,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            order_type: OrderType::Market,
            limit_slippage_pct: Decimal::new(1, 1),
            tick_size: Decimal::new(1, 5),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily-rolling log files go here when set.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: String,
    pub api_secret: String,
    pub pair: String,
    pub trade_volume: Decimal,
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub live_trading: bool,
    pub order: OrderConfig,
    pub strategy: StrategyConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            pair: "XXRPZUSD".to_string(),
            trade_volume: Decimal::from(15),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: 30,
            request_timeout_secs: 10,
            live_trading: false,
            order: OrderConfig::default(),
            strategy: StrategyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// `Settings.{toml,yaml,json}` if present, then `APP_*` environment variables
    /// (`APP_STRATEGY__SHORT_PERIOD` for nested keys).
    pub fn new() -> BotResult<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("Settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_config(builder.build()?)
    }

    pub fn from_config(config: Config) -> BotResult<Self> {
        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> BotResult<()> {
        let s = &self.strategy;
        if s.short_period == 0 || s.short_period >= s.long_period {
            return Err(BotError::Configuration(format!(
                "SMA periods must satisfy 0 < short < long, got {}/{}",
                s.short_period, s.long_period
            )));
        }
        if s.sharp_up_pct <= 0.0 || s.sharp_down_pct <= 0.0 {
            return Err(BotError::Configuration(
                "sharp trend thresholds must be positive".into(),
            ));
        }
        if s.ohlc_interval_minutes == 0 || self.poll_interval_secs == 0 || self.request_timeout_secs == 0 {
            return Err(BotError::Configuration(
                "intervals and timeouts must be non-zero".into(),
            ));
        }
        if self.trade_volume <= Decimal::ZERO {
            return Err(BotError::Configuration("trade_volume must be positive".into()));
        }
        if self.pair.trim().is_empty() {
            return Err(BotError::Configuration("pair must be set".into()));
        }
        if self.order.limit_slippage_pct < Decimal::ZERO || self.order.tick_size < Decimal::ZERO {
            return Err(BotError::Configuration(
                "limit slippage and tick size cannot be negative".into(),
            ));
        }
        if self.live_trading {
            if self.api_key.trim().is_empty() {
                return Err(BotError::Configuration(
                    "api_key is required for live trading".into(),
                ));
            }
            RequestSigner::from_base64(&self.api_secret)?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Three request timeouts per cycle: ticker, OHLC and the order.
    pub fn cycle_timeout(&self) -> Duration {
        self.request_timeout() * 3
    }
}
