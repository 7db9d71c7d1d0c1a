//! Primitive provider: key generation, JWK import/export, raw sign and verify.
//!
//! Everything above this module works on [`Jwk`] values and token strings;
//! everything below it is a third-party primitive. The dispatch here checks
//! that a key belongs to the requested [`AlgorithmSpec`] before any
//! primitive runs.

mod ec;
mod okp;
mod rsassa;
mod secret;

use std::fmt;

use sha2::Digest;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::jwk::{Jwk, KEY_OP_SIGN, KEY_OP_VERIFY};
use crate::types::{AlgorithmSpec, Family, HashAlgorithm};

pub use ec::{EcSigningKey, EcVerifyingKey};

/// What an imported key will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    Sign,
    Verify,
}

impl KeyUsage {
    fn key_op(self) -> &'static str {
        match self {
            KeyUsage::Sign => KEY_OP_SIGN,
            KeyUsage::Verify => KEY_OP_VERIFY,
        }
    }
}

/// An imported key, ready for the primitives.
pub enum KeyHandle {
    /// HMAC secret.
    Secret(Zeroizing<Vec<u8>>),
    RsaPrivate(Box<rsa::RsaPrivateKey>),
    RsaPublic(Box<rsa::RsaPublicKey>),
    EcPrivate(EcSigningKey),
    EcPublic(EcVerifyingKey),
    Ed25519Private(Box<ed25519_dalek::SigningKey>),
    Ed25519Public([u8; 32]),
}

impl KeyHandle {
    pub fn kind(&self) -> &'static str {
        match self {
            KeyHandle::Secret(_) => "secret",
            KeyHandle::RsaPrivate(_) => "RSA private",
            KeyHandle::RsaPublic(_) => "RSA public",
            KeyHandle::EcPrivate(_) => "EC private",
            KeyHandle::EcPublic(_) => "EC public",
            KeyHandle::Ed25519Private(_) => "Ed25519 private",
            KeyHandle::Ed25519Public(_) => "Ed25519 public",
        }
    }
}

// Key bytes stay out of logs.
impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyHandle").field(&self.kind()).finish()
    }
}

/// Generate a fresh key able to both sign and verify under `spec`.
pub fn generate_key(spec: &AlgorithmSpec) -> Result<KeyHandle, CryptoError> {
    spec.validate()?;
    match spec.family {
        Family::Hmac => Ok(secret::generate(spec.hash)),
        Family::RsaPkcs1 | Family::RsaPss => rsassa::generate(spec.modulus_bits()),
        Family::Ecdsa => Ok(ec::generate(required_curve(spec)?)),
        Family::Ed25519 => Ok(okp::generate()),
    }
}

/// Export a key as a JWK. Private keys export every member needed to
/// re-import them for signing.
pub fn export_key(key: &KeyHandle, spec: &AlgorithmSpec) -> Result<Jwk, CryptoError> {
    let mut jwk = match key {
        KeyHandle::Secret(secret) => secret::export(secret),
        KeyHandle::RsaPrivate(key) => rsassa::export_private(key)?,
        KeyHandle::RsaPublic(key) => rsassa::export_public(key),
        KeyHandle::EcPrivate(key) => ec::export_private(key),
        KeyHandle::EcPublic(key) => ec::export_public(key),
        KeyHandle::Ed25519Private(key) => okp::export_private(key),
        KeyHandle::Ed25519Public(key) => okp::export_public(key),
    };
    expect_kty(&jwk, spec)?;
    jwk.alg = spec.jwk_alg();
    jwk.key_ops = Some(match key {
        KeyHandle::Secret(_)
        | KeyHandle::RsaPrivate(_)
        | KeyHandle::EcPrivate(_)
        | KeyHandle::Ed25519Private(_) => vec![KEY_OP_SIGN.to_string(), KEY_OP_VERIFY.to_string()],
        _ => vec![KEY_OP_VERIFY.to_string()],
    });
    jwk.ext = Some(true);
    Ok(jwk)
}

/// Import a JWK under `spec` for `usage`.
///
/// Fails with [`CryptoError::AlgorithmMismatch`] when the key belongs to a
/// different algorithm, and [`CryptoError::InvalidKey`] when it is malformed
/// or lacks the private material signing needs.
pub fn import_key(jwk: &Jwk, spec: &AlgorithmSpec, usage: KeyUsage) -> Result<KeyHandle, CryptoError> {
    spec.validate()?;
    expect_kty(jwk, spec)?;
    if !jwk.permits(usage.key_op()) {
        return Err(CryptoError::AlgorithmMismatch(format!(
            "key_ops does not permit {}",
            usage.key_op()
        )));
    }
    if let Some(alg) = jwk.alg.as_deref() {
        if !alg_matches(alg, spec) {
            return Err(CryptoError::AlgorithmMismatch(format!(
                "key is for {alg}, requested {spec}"
            )));
        }
    }
    if usage == KeyUsage::Sign && !jwk.is_private() {
        return Err(CryptoError::InvalidKey(
            "public key cannot be used for signing".into(),
        ));
    }

    match spec.family {
        Family::Hmac => secret::import(jwk),
        Family::RsaPkcs1 | Family::RsaPss => rsassa::import(jwk, usage),
        Family::Ecdsa => ec::import(jwk, required_curve(spec)?, usage),
        Family::Ed25519 => okp::import(jwk, usage),
    }
}

/// Produce the raw signature bytes over `message`.
pub fn sign(spec: &AlgorithmSpec, key: &KeyHandle, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match (spec.family, key) {
        (Family::Hmac, KeyHandle::Secret(secret)) => secret::sign(spec.hash, secret, message),
        (Family::RsaPkcs1 | Family::RsaPss, KeyHandle::RsaPrivate(key)) => {
            rsassa::sign(spec, key, message)
        }
        (Family::Ecdsa, KeyHandle::EcPrivate(key)) => ec::sign(spec.hash, key, message),
        (Family::Ed25519, KeyHandle::Ed25519Private(key)) => Ok(okp::sign(key, message)),
        (family, key) => Err(mismatch(family, key)),
    }
}

/// Check `signature` over `message`. Malformed signatures are `Ok(false)`.
pub fn verify(
    spec: &AlgorithmSpec,
    key: &KeyHandle,
    signature: &[u8],
    message: &[u8],
) -> Result<bool, CryptoError> {
    match (spec.family, key) {
        (Family::Hmac, KeyHandle::Secret(secret)) => {
            Ok(secret::verify(spec.hash, secret, signature, message))
        }
        (Family::RsaPkcs1 | Family::RsaPss, KeyHandle::RsaPublic(key)) => {
            Ok(rsassa::verify(spec, key, signature, message))
        }
        (Family::RsaPkcs1 | Family::RsaPss, KeyHandle::RsaPrivate(key)) => {
            Ok(rsassa::verify(spec, &key.to_public_key(), signature, message))
        }
        (Family::Ecdsa, KeyHandle::EcPublic(key)) => {
            Ok(ec::verify(spec.hash, key, signature, message))
        }
        (Family::Ecdsa, KeyHandle::EcPrivate(key)) => {
            Ok(ec::verify(spec.hash, &key.verifying_key(), signature, message))
        }
        (Family::Ed25519, KeyHandle::Ed25519Public(key)) => Ok(okp::verify(key, signature, message)),
        (Family::Ed25519, KeyHandle::Ed25519Private(key)) => Ok(okp::verify(
            &key.verifying_key().to_bytes(),
            signature,
            message,
        )),
        (family, key) => Err(mismatch(family, key)),
    }
}

/// Hash `message` with `hash`.
pub(crate) fn digest(hash: HashAlgorithm, message: &[u8]) -> Vec<u8> {
    match hash {
        HashAlgorithm::Sha1 => sha1::Sha1::digest(message).to_vec(),
        HashAlgorithm::Sha256 => sha2::Sha256::digest(message).to_vec(),
        HashAlgorithm::Sha384 => sha2::Sha384::digest(message).to_vec(),
        HashAlgorithm::Sha512 => sha2::Sha512::digest(message).to_vec(),
    }
}

fn required_curve(spec: &AlgorithmSpec) -> Result<crate::types::NamedCurve, CryptoError> {
    spec.curve
        .ok_or_else(|| CryptoError::Unsupported("ECDSA requires a named curve".into()))
}

fn expected_kty(family: Family) -> &'static str {
    match family {
        Family::Hmac => "oct",
        Family::RsaPkcs1 | Family::RsaPss => "RSA",
        Family::Ecdsa => "EC",
        Family::Ed25519 => "OKP",
    }
}

fn expect_kty(jwk: &Jwk, spec: &AlgorithmSpec) -> Result<(), CryptoError> {
    let expected = expected_kty(spec.family);
    if jwk.kty != expected {
        return Err(CryptoError::AlgorithmMismatch(format!(
            "{} needs a `{expected}` key, got `{}`",
            spec.family.name(),
            jwk.kty
        )));
    }
    Ok(())
}

/// Whether a JWK `alg` member is compatible with the requested algorithm.
fn alg_matches(alg: &str, spec: &AlgorithmSpec) -> bool {
    match spec.family {
        Family::Hmac | Family::RsaPkcs1 | Family::RsaPss => {
            spec.jwk_alg().is_some_and(|expected| expected == alg)
        }
        Family::Ecdsa => match spec.curve {
            Some(crate::types::NamedCurve::P256) => alg == "ES256",
            Some(crate::types::NamedCurve::P384) => alg == "ES384",
            None => false,
        },
        Family::Ed25519 => alg == "EdDSA" || alg == "Ed25519",
    }
}

fn mismatch(family: Family, key: &KeyHandle) -> CryptoError {
    CryptoError::AlgorithmMismatch(format!(
        "{} key cannot be used with {}",
        key.kind(),
        family.name()
    ))
}
