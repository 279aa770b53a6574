pub mod nonce;
pub mod precision;
