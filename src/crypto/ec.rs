//! ECDSA over P-256 and P-384. Signatures are the fixed-width `r || s`
//! encoding; nonces follow RFC 6979, so signing is deterministic.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use zeroize::Zeroizing;

use super::{digest, KeyHandle, KeyUsage};
use crate::error::CryptoError;
use crate::jwk::{self, Jwk};
use crate::types::{HashAlgorithm, NamedCurve};

/// Private ECDSA key on one of the supported curves.
#[derive(Debug, Clone)]
pub enum EcSigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

/// Public ECDSA key on one of the supported curves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcVerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl EcSigningKey {
    pub fn curve(&self) -> NamedCurve {
        match self {
            EcSigningKey::P256(_) => NamedCurve::P256,
            EcSigningKey::P384(_) => NamedCurve::P384,
        }
    }

    pub fn verifying_key(&self) -> EcVerifyingKey {
        match self {
            EcSigningKey::P256(key) => EcVerifyingKey::P256(p256::ecdsa::VerifyingKey::from(key)),
            EcSigningKey::P384(key) => EcVerifyingKey::P384(p384::ecdsa::VerifyingKey::from(key)),
        }
    }
}

impl EcVerifyingKey {
    pub fn curve(&self) -> NamedCurve {
        match self {
            EcVerifyingKey::P256(_) => NamedCurve::P256,
            EcVerifyingKey::P384(_) => NamedCurve::P384,
        }
    }

    /// Affine coordinates, each `field_len` bytes.
    fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        match self {
            EcVerifyingKey::P256(key) => {
                let point = key.to_encoded_point(false);
                (
                    point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    point.y().map(|y| y.to_vec()).unwrap_or_default(),
                )
            }
            EcVerifyingKey::P384(key) => {
                let point = key.to_encoded_point(false);
                (
                    point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    point.y().map(|y| y.to_vec()).unwrap_or_default(),
                )
            }
        }
    }
}

pub(super) fn generate(curve: NamedCurve) -> KeyHandle {
    let mut rng = rand::rngs::OsRng;
    KeyHandle::EcPrivate(match curve {
        NamedCurve::P256 => EcSigningKey::P256(p256::ecdsa::SigningKey::random(&mut rng)),
        NamedCurve::P384 => EcSigningKey::P384(p384::ecdsa::SigningKey::random(&mut rng)),
    })
}

pub(super) fn export_public(key: &EcVerifyingKey) -> Jwk {
    let (x, y) = key.coordinates();
    Jwk {
        crv: Some(key.curve().name().to_string()),
        x: Some(jwk::b64url_encode(&x)),
        y: Some(jwk::b64url_encode(&y)),
        ..Jwk::new("EC")
    }
}

pub(super) fn export_private(key: &EcSigningKey) -> Jwk {
    let scalar = Zeroizing::new(match key {
        EcSigningKey::P256(key) => key.to_bytes().to_vec(),
        EcSigningKey::P384(key) => key.to_bytes().to_vec(),
    });
    Jwk {
        d: Some(jwk::b64url_encode(&scalar)),
        ..export_public(&key.verifying_key())
    }
}

pub(super) fn import(key: &Jwk, curve: NamedCurve, usage: KeyUsage) -> Result<KeyHandle, CryptoError> {
    if key.crv.as_deref() != Some(curve.name()) {
        return Err(CryptoError::AlgorithmMismatch(format!(
            "key curve {:?} does not match {}",
            key.crv,
            curve.name()
        )));
    }

    let x = jwk::required("x", key.x.as_ref())?;
    let y = jwk::required("y", key.y.as_ref())?;
    if x.len() != curve.field_len() || y.len() != curve.field_len() {
        return Err(CryptoError::InvalidKey(format!(
            "{} coordinates must be {} bytes",
            curve.name(),
            curve.field_len()
        )));
    }
    let mut sec1 = Vec::with_capacity(1 + 2 * curve.field_len());
    sec1.push(0x04);
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);

    let public = match curve {
        NamedCurve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map(EcVerifyingKey::P256),
        NamedCurve::P384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map(EcVerifyingKey::P384),
    }
    .map_err(|e| CryptoError::InvalidKey(format!("point is not on {}: {e}", curve.name())))?;

    if usage == KeyUsage::Verify {
        return Ok(KeyHandle::EcPublic(public));
    }

    let scalar = Zeroizing::new(jwk::required("d", key.d.as_ref())?);
    if scalar.len() != curve.field_len() {
        return Err(CryptoError::InvalidKey(format!(
            "{} private scalar must be {} bytes",
            curve.name(),
            curve.field_len()
        )));
    }
    let private = match curve {
        NamedCurve::P256 => p256::ecdsa::SigningKey::from_slice(&scalar).map(EcSigningKey::P256),
        NamedCurve::P384 => p384::ecdsa::SigningKey::from_slice(&scalar).map(EcSigningKey::P384),
    }
    .map_err(|e| CryptoError::InvalidKey(format!("invalid {} scalar: {e}", curve.name())))?;

    if private.verifying_key() != public {
        return Err(CryptoError::InvalidKey(
            "private scalar does not match the public coordinates".into(),
        ));
    }
    Ok(KeyHandle::EcPrivate(private))
}

pub(super) fn sign(hash: HashAlgorithm, key: &EcSigningKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let prehash = digest(hash, message);
    let failed = |e: p256::ecdsa::Error| CryptoError::Failed(format!("ECDSA signing failed: {e}"));
    match key {
        EcSigningKey::P256(key) => {
            let signature: p256::ecdsa::Signature = key.sign_prehash(&prehash).map_err(failed)?;
            Ok(signature.to_bytes().to_vec())
        }
        EcSigningKey::P384(key) => {
            let signature: p384::ecdsa::Signature = key.sign_prehash(&prehash).map_err(failed)?;
            Ok(signature.to_bytes().to_vec())
        }
    }
}

pub(super) fn verify(hash: HashAlgorithm, key: &EcVerifyingKey, signature: &[u8], message: &[u8]) -> bool {
    let prehash = digest(hash, message);
    match key {
        EcVerifyingKey::P256(key) => p256::ecdsa::Signature::from_slice(signature)
            .is_ok_and(|sig| key.verify_prehash(&prehash, &sig).is_ok()),
        EcVerifyingKey::P384(key) => p384::ecdsa::Signature::from_slice(signature)
            .is_ok_and(|sig| key.verify_prehash(&prehash, &sig).is_ok()),
    }
}
