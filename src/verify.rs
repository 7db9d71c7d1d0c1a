//! Token verification.
//!
//! A token that is expired, tampered with, signed with another key or
//! algorithm, or otherwise malformed yields `Ok(false)`. Errors are
//! reserved for algorithm specs no provider supports and keys that cannot
//! be parsed at all.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use serde::Serialize;
use tracing::debug;

use crate::crypto::{self, KeyUsage};
use crate::error::{CryptoError, TokenError};
use crate::jwk::Jwk;
use crate::sign::{resolve_now, signed_material};
use crate::types::{AlgorithmSpec, EXPIRY_DELIMITER};

/// The parts of a token, readable without a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    /// Base64 signature as it appears in the token.
    pub signature: String,
    /// Expiry in Unix seconds; `None` for a token that never expires.
    pub expires_at: Option<u64>,
}

/// Split a token at the first delimiter into signature and expiry parts.
fn split_token(token: &str) -> (&str, Option<&str>) {
    match token.split_once(EXPIRY_DELIMITER) {
        Some((signature, expiry)) => (signature, Some(expiry)),
        None => (token, None),
    }
}

/// Strict decimal seconds: ASCII digits only, no sign, no whitespace.
fn parse_expiry(expiry: &str) -> Option<u64> {
    if expiry.is_empty() || !expiry.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    expiry.parse().ok()
}

fn decode_signature(signature: &str) -> Option<Vec<u8>> {
    STANDARD
        .decode(signature)
        .or_else(|_| URL_SAFE.decode(signature))
        .ok()
}

/// Parse a token without verifying it.
pub fn inspect_token(token: &str) -> Result<TokenInfo, TokenError> {
    let (signature, expiry) = split_token(token.trim());
    if decode_signature(signature).is_none() {
        return Err(TokenError::MalformedToken(
            "signature is not valid base64".into(),
        ));
    }
    let expires_at = match expiry {
        Some(expiry) => Some(parse_expiry(expiry).ok_or_else(|| {
            TokenError::MalformedToken(format!("expiry `{expiry}` is not a decimal timestamp"))
        })?),
        None => None,
    };
    Ok(TokenInfo {
        signature: signature.to_string(),
        expires_at,
    })
}

/// Verify `token` over `data` with `key` under `algorithm`.
///
/// `now_ms` overrides the clock used for the expiry check; `None` or
/// `Some(0)` reads the system clock. An expired token is rejected before any
/// signature work is done.
pub fn verify(
    key: &Jwk,
    token: &str,
    data: &str,
    algorithm: &AlgorithmSpec,
    now_ms: Option<u64>,
) -> Result<bool, TokenError> {
    let (signature, expiry) = split_token(token);

    let suffix = match expiry {
        Some(expiry) => {
            let Some(expires_at) = parse_expiry(expiry) else {
                debug!(expiry, "rejecting token with malformed expiry");
                return Ok(false);
            };
            let now_ms = resolve_now(now_ms);
            if now_ms > expires_at.saturating_mul(1000) {
                debug!(expires_at, now_ms, "rejecting expired token");
                return Ok(false);
            }
            format!("{EXPIRY_DELIMITER}{expiry}")
        }
        None => String::new(),
    };

    let handle = match crypto::import_key(key, algorithm, KeyUsage::Verify) {
        Ok(handle) => handle,
        Err(CryptoError::AlgorithmMismatch(reason)) => {
            debug!(%algorithm, %reason, "rejecting token: key belongs to another algorithm");
            return Ok(false);
        }
        Err(e) => return Err(TokenError::Verification(e)),
    };

    let Some(signature) = decode_signature(signature) else {
        debug!("rejecting token with undecodable signature");
        return Ok(false);
    };

    let valid = crypto::verify(
        algorithm,
        &handle,
        &signature,
        &signed_material(data, &suffix),
    )
    .map_err(TokenError::Verification)?;
    if !valid {
        debug!(%algorithm, "signature mismatch");
    }
    Ok(valid)
}
