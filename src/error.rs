// src/error.rs
use thiserror::Error;

pub type BotResult<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    /// Bad credentials or settings. Aborts startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("exchange rejected request: {}", .0.join("; "))]
    ExchangeRejection(Vec<String>),

    #[error("malformed exchange response: {0}")]
    MalformedResponse(String),
}

impl BotError {
    /// Only configuration problems stop the process; everything else skips a cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Configuration(_))
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BotError::MalformedResponse(e.to_string())
        } else {
            BotError::Transport(e.to_string())
        }
    }
}

impl From<config::ConfigError> for BotError {
    fn from(e: config::ConfigError) -> Self {
        BotError::Configuration(e.to_string())
    }
}

impl From<url::ParseError> for BotError {
    fn from(e: url::ParseError) -> Self {
        BotError::Configuration(format!("invalid url: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_is_fatal() {
        assert!(BotError::Configuration("bad secret".into()).is_fatal());
        assert!(!BotError::InsufficientData {
            required: 2,
            available: 1
        }
        .is_fatal());
        assert!(!BotError::Transport("timeout".into()).is_fatal());
        assert!(!BotError::ExchangeRejection(vec!["EOrder:Insufficient funds".into()]).is_fatal());
    }

    #[test]
    fn rejection_message_joins_exchange_errors() {
        let err = BotError::ExchangeRejection(vec!["EGeneral:Invalid arguments".into(), "EAPI:Invalid nonce".into()]);
        assert_eq!(
            err.to_string(),
            "exchange rejected request: EGeneral:Invalid arguments; EAPI:Invalid nonce"
        );
    }
}
