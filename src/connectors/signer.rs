// src/connectors/signer.rs
use crate::error::{BotError, BotResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Kraken `API-Sign` generator holding the decoded private key.
#[derive(Clone)]
pub struct RequestSigner {
    mac: HmacSha512,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn from_base64(secret: &str) -> BotResult<Self> {
        let key = STANDARD
            .decode(secret.trim())
            .map_err(|e| BotError::Configuration(format!("API secret is not valid base64: {e}")))?;
        let mac = HmacSha512::new_from_slice(&key)
            .map_err(|e| BotError::Configuration(format!("API secret rejected as HMAC key: {e}")))?;
        Ok(Self { mac })
    }

    /// base64(HMAC-SHA512(key, path ++ SHA256(nonce ++ body)))
    pub fn sign(&self, path: &str, nonce: u64, body: &str) -> String {
        let inner = Sha256::digest(format!("{nonce}{body}").as_bytes());

        let mut mac = self.mac.clone();
        mac.update(path.as_bytes());
        mac.update(&inner);

        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// One-shot signing with a base64 secret.
pub fn sign(path: &str, nonce: u64, body: &str, secret: &str) -> BotResult<String> {
    Ok(RequestSigner::from_base64(secret)?.sign(path, nonce, body))
}
