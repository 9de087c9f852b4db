//! Ed25519 request signing.
//!
//! Every private REST call and the WebSocket subscription carry a
//! signature over the canonical message
//! `instruction=<name>[&k1=v1&k2=v2...]&timestamp=<ms>&window=<ms>`
//! with parameters sorted lexicographically by key. The message bytes are
//! signed directly (no pre-hash) and the signature is base64-encoded.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::{Signer as _, SigningKey};
use std::collections::BTreeMap;
use thiserror::Error;
use zeroize::Zeroizing;

/// PKCS#8 v1 DER header for an Ed25519 private key; the 32-byte raw seed
/// is appended to form a complete document.
const PKCS8_ED25519_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04,
    0x20,
];

/// Length of the raw Ed25519 seed.
const SEED_LEN: usize = 32;

/// Key management errors.
///
/// All of these are construction-time and fatal: a bot with unusable key
/// material cannot do anything, so there is no retry path.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Failed to decode base64 key material: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Key material too short: expected at least {SEED_LEN} bytes, got {0}")]
    TooShort(usize),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// Signs exchange requests with the account's Ed25519 key.
///
/// The API secret supplied by the environment is the base64-encoded raw
/// 32-byte seed. It is wrapped into a standard PKCS#8 DER document once at
/// construction, not per signature.
#[derive(Clone)]
pub struct RequestSigner {
    api_key: String,
    signing_key: SigningKey,
}

impl RequestSigner {
    /// Build a signer from the API key and the base64-encoded seed.
    pub fn new(api_key: impl Into<String>, api_secret_b64: &str) -> Result<Self, SignerError> {
        let raw = Zeroizing::new(BASE64.decode(api_secret_b64.trim())?);
        if raw.len() < SEED_LEN {
            return Err(SignerError::TooShort(raw.len()));
        }

        let mut der = Zeroizing::new(Vec::with_capacity(PKCS8_ED25519_PREFIX.len() + SEED_LEN));
        der.extend_from_slice(&PKCS8_ED25519_PREFIX);
        der.extend_from_slice(&raw[..SEED_LEN]);

        let signing_key = SigningKey::from_pkcs8_der(&der)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            signing_key,
        })
    }

    /// The account API key sent alongside every signature.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign an instruction with its parameters at the given timestamp.
    ///
    /// Returns the base64-encoded signature. Deterministic for identical
    /// inputs (Ed25519 is a deterministic scheme).
    pub fn sign(
        &self,
        instruction: &str,
        params: &BTreeMap<String, String>,
        timestamp_ms: i64,
        window_ms: u64,
    ) -> String {
        let message = signing_message(instruction, params, timestamp_ms, window_ms);
        let signature = self.signing_key.sign(message.as_bytes());
        BASE64.encode(signature.to_bytes())
    }

    /// Base64-encoded public key, for verification and diagnostics.
    pub fn public_key(&self) -> String {
        BASE64.encode(self.signing_key.verifying_key().to_bytes())
    }
}

/// Canonical signing message. The params segment is omitted entirely when
/// there are no parameters; `BTreeMap` iteration provides the required
/// lexicographic key order.
fn signing_message(
    instruction: &str,
    params: &BTreeMap<String, String>,
    timestamp_ms: i64,
    window_ms: u64,
) -> String {
    let mut message = format!("instruction={instruction}");
    for (key, value) in params {
        message.push('&');
        message.push_str(key);
        message.push('=');
        message.push_str(value);
    }
    message.push_str(&format!("&timestamp={timestamp_ms}&window={window_ms}"));
    message
}
