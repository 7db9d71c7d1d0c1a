//! Ed25519 (`kty = "OKP"`). Signing uses `ed25519-dalek`, verification `ring`.

use ed25519_dalek::Signer as _;
use ring::signature;
use zeroize::Zeroizing;

use super::{KeyHandle, KeyUsage};
use crate::error::CryptoError;
use crate::jwk::{self, Jwk};
use crate::types::ED25519_KEY_LEN;

const CURVE: &str = "Ed25519";

pub(super) fn generate() -> KeyHandle {
    let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
    KeyHandle::Ed25519Private(Box::new(key))
}

pub(super) fn export_public(public_key: &[u8; ED25519_KEY_LEN]) -> Jwk {
    Jwk {
        crv: Some(CURVE.to_string()),
        x: Some(jwk::b64url_encode(public_key)),
        ..Jwk::new("OKP")
    }
}

pub(super) fn export_private(key: &ed25519_dalek::SigningKey) -> Jwk {
    let seed = Zeroizing::new(key.to_bytes());
    Jwk {
        d: Some(jwk::b64url_encode(seed.as_slice())),
        ..export_public(&key.verifying_key().to_bytes())
    }
}

pub(super) fn import(key: &Jwk, usage: KeyUsage) -> Result<KeyHandle, CryptoError> {
    if key.crv.as_deref() != Some(CURVE) {
        return Err(CryptoError::AlgorithmMismatch(format!(
            "OKP key curve {:?} is not {CURVE}",
            key.crv
        )));
    }
    let public_key = fixed("x", &jwk::required("x", key.x.as_ref())?)?;

    if usage == KeyUsage::Verify {
        return Ok(KeyHandle::Ed25519Public(public_key));
    }

    let seed = Zeroizing::new(fixed("d", &jwk::required("d", key.d.as_ref())?)?);
    let private = ed25519_dalek::SigningKey::from_bytes(&seed);
    if private.verifying_key().to_bytes() != public_key {
        return Err(CryptoError::InvalidKey(
            "Ed25519 seed does not match the public key".into(),
        ));
    }
    Ok(KeyHandle::Ed25519Private(Box::new(private)))
}

pub(super) fn sign(key: &ed25519_dalek::SigningKey, message: &[u8]) -> Vec<u8> {
    key.sign(message).to_bytes().to_vec()
}

pub(super) fn verify(public_key: &[u8; ED25519_KEY_LEN], signature: &[u8], message: &[u8]) -> bool {
    signature::UnparsedPublicKey::new(&signature::ED25519, public_key)
        .verify(message, signature)
        .is_ok()
}

fn fixed(member: &str, bytes: &[u8]) -> Result<[u8; ED25519_KEY_LEN], CryptoError> {
    <[u8; ED25519_KEY_LEN]>::try_from(bytes).map_err(|_| {
        CryptoError::InvalidKey(format!(
            "Ed25519 `{member}` must be {ED25519_KEY_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}
