//! Token signing.
//!
//! A token is `base64(signature)` optionally followed by `::<expiry>`, where
//! the expiry is a Unix timestamp in seconds. The suffix is appended to the
//! payload before signing, so the expiry is authenticated along with it.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::crypto::{self, KeyUsage};
use crate::error::{CryptoError, TokenError};
use crate::jwk::Jwk;
use crate::types::{AlgorithmSpec, EXPIRY_DELIMITER};

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// The clock override if one is given, else the system clock. An override of
/// 0 also means "use the system clock".
pub(crate) fn resolve_now(now_ms: Option<u64>) -> u64 {
    now_ms.filter(|&ms| ms != 0).unwrap_or_else(now_millis)
}

/// The `::<expiry>` suffix for a token valid `expire_secs` from `now_ms`,
/// or an empty string when `expire_secs` is 0.
pub fn expiry_suffix(expire_secs: u64, now_ms: Option<u64>) -> Result<String, TokenError> {
    if expire_secs == 0 {
        return Ok(String::new());
    }
    let now_ms = resolve_now(now_ms);
    let expires_at = expire_secs
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(now_ms))
        .map(|ms| ms / 1000)
        .ok_or_else(|| {
            TokenError::Signing(CryptoError::Failed(format!(
                "expiry of {expire_secs}s overflows the timestamp range"
            )))
        })?;
    Ok(format!("{EXPIRY_DELIMITER}{expires_at}"))
}

/// The exact bytes covered by the signature.
pub(crate) fn signed_material(data: &str, suffix: &str) -> Vec<u8> {
    let mut material = Vec::with_capacity(data.len() + suffix.len());
    material.extend_from_slice(data.as_bytes());
    material.extend_from_slice(suffix.as_bytes());
    material
}

/// Sign `data` with `key` under `algorithm`.
///
/// `expire_secs = 0` produces a token that never expires. `now_ms`
/// overrides the clock used to compute the expiry; `None` or `Some(0)` reads
/// the system clock.
///
/// HMAC, RSASSA-PKCS1-v1_5, ECDSA and Ed25519 signatures are deterministic,
/// so identical inputs give identical tokens. RSA-PSS draws a random salt
/// and gives a different (equally valid) token on every call.
pub fn sign(
    key: &Jwk,
    data: &str,
    algorithm: &AlgorithmSpec,
    expire_secs: u64,
    now_ms: Option<u64>,
) -> Result<String, TokenError> {
    let suffix = expiry_suffix(expire_secs, now_ms)?;
    let handle = crypto::import_key(key, algorithm, KeyUsage::Sign).map_err(TokenError::Signing)?;
    let signature = crypto::sign(algorithm, &handle, &signed_material(data, &suffix))
        .map_err(TokenError::Signing)?;
    debug!(%algorithm, expires = !suffix.is_empty(), "signed token");
    Ok(format!("{}{suffix}", STANDARD.encode(signature)))
}
