//! HMAC over a symmetric secret. Signing uses the RustCrypto `hmac` crate;
//! verification goes through `ring` for a constant-time tag comparison.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use rand::RngCore;
use ring::hmac as ring_hmac;
use zeroize::Zeroizing;

use super::KeyHandle;
use crate::error::CryptoError;
use crate::jwk::{self, Jwk};
use crate::types::HashAlgorithm;

/// A fresh secret as long as the digest's block.
pub(super) fn generate(hash: HashAlgorithm) -> KeyHandle {
    let mut secret = Zeroizing::new(vec![0u8; hash.block_len()]);
    rand::rngs::OsRng.fill_bytes(&mut secret);
    KeyHandle::Secret(secret)
}

pub(super) fn export(secret: &[u8]) -> Jwk {
    Jwk {
        k: Some(jwk::b64url_encode(secret)),
        ..Jwk::new("oct")
    }
}

pub(super) fn import(key: &Jwk) -> Result<KeyHandle, CryptoError> {
    let secret = Zeroizing::new(jwk::required("k", key.k.as_ref())?);
    if secret.is_empty() {
        return Err(CryptoError::InvalidKey("HMAC secret is empty".into()));
    }
    Ok(KeyHandle::Secret(secret))
}

pub(super) fn sign(hash: HashAlgorithm, secret: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match hash {
        HashAlgorithm::Sha1 => tag::<Hmac<sha1::Sha1>>(secret, message),
        HashAlgorithm::Sha256 => tag::<Hmac<sha2::Sha256>>(secret, message),
        HashAlgorithm::Sha384 => tag::<Hmac<sha2::Sha384>>(secret, message),
        HashAlgorithm::Sha512 => tag::<Hmac<sha2::Sha512>>(secret, message),
    }
}

pub(super) fn verify(hash: HashAlgorithm, secret: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let algorithm = match hash {
        HashAlgorithm::Sha1 => ring_hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::Sha256 => ring_hmac::HMAC_SHA256,
        HashAlgorithm::Sha384 => ring_hmac::HMAC_SHA384,
        HashAlgorithm::Sha512 => ring_hmac::HMAC_SHA512,
    };
    let key = ring_hmac::Key::new(algorithm, secret);
    ring_hmac::verify(&key, message, signature).is_ok()
}

fn tag<M: Mac + KeyInit>(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = <M as KeyInit>::new_from_slice(secret)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
