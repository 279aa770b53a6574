pub mod kraken;
pub mod messages;
pub mod paper;
pub mod signer;
pub mod traits;
