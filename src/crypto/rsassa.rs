//! RSASSA-PKCS1-v1_5 and RSA-PSS on the `rsa` crate.

use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use super::{digest, KeyHandle, KeyUsage};
use crate::error::CryptoError;
use crate::jwk::{self, Jwk};
use crate::types::{
    AlgorithmSpec, Family, HashAlgorithm, MAX_MODULUS_LENGTH, MIN_MODULUS_LENGTH, RSA_PUBLIC_EXPONENT,
};

pub(super) fn generate(bits: u32) -> Result<KeyHandle, CryptoError> {
    let exponent = BigUint::from(RSA_PUBLIC_EXPONENT);
    let key = RsaPrivateKey::new_with_exp(&mut rand::rngs::OsRng, bits as usize, &exponent)
        .map_err(|e| CryptoError::Failed(format!("RSA key generation failed: {e}")))?;
    Ok(KeyHandle::RsaPrivate(Box::new(key)))
}

pub(super) fn export_public(key: &RsaPublicKey) -> Jwk {
    Jwk {
        n: Some(encode(key.n())),
        e: Some(encode(key.e())),
        ..Jwk::new("RSA")
    }
}

pub(super) fn export_private(key: &RsaPrivateKey) -> Result<Jwk, CryptoError> {
    let [p, q] = key.primes() else {
        return Err(CryptoError::InvalidKey(
            "multi-prime RSA keys cannot be exported".into(),
        ));
    };
    let one = BigUint::from(1u32);
    let d = key.d();
    let qi = key
        .crt_coefficient()
        .ok_or_else(|| CryptoError::InvalidKey("RSA primes have no CRT coefficient".into()))?;
    Ok(Jwk {
        n: Some(encode(key.n())),
        e: Some(encode(key.e())),
        d: Some(encode(d)),
        p: Some(encode(p)),
        q: Some(encode(q)),
        dp: Some(encode(&(d % &(p - &one)))),
        dq: Some(encode(&(d % &(q - &one)))),
        qi: Some(encode(&qi)),
        ..Jwk::new("RSA")
    })
}

pub(super) fn import(key: &Jwk, usage: KeyUsage) -> Result<KeyHandle, CryptoError> {
    let n = integer("n", key.n.as_ref())?;
    let e = integer("e", key.e.as_ref())?;
    let bits = n.bits();
    if bits < MIN_MODULUS_LENGTH as usize || bits > MAX_MODULUS_LENGTH as usize {
        return Err(CryptoError::InvalidKey(format!(
            "RSA modulus of {bits} bits outside {MIN_MODULUS_LENGTH}..={MAX_MODULUS_LENGTH}"
        )));
    }

    match usage {
        KeyUsage::Verify => {
            let public = RsaPublicKey::new(n, e)
                .map_err(|err| CryptoError::InvalidKey(format!("invalid RSA public key: {err}")))?;
            Ok(KeyHandle::RsaPublic(Box::new(public)))
        }
        KeyUsage::Sign => {
            let d = integer("d", key.d.as_ref())?;
            let p = integer("p", key.p.as_ref())?;
            let q = integer("q", key.q.as_ref())?;
            let private = RsaPrivateKey::from_components(n, e, d, vec![p, q])
                .map_err(|err| CryptoError::InvalidKey(format!("invalid RSA private key: {err}")))?;
            private
                .validate()
                .map_err(|err| CryptoError::InvalidKey(format!("inconsistent RSA private key: {err}")))?;
            Ok(KeyHandle::RsaPrivate(Box::new(private)))
        }
    }
}

/// PKCS#1 v1.5 signing is deterministic; PSS draws a fresh random salt.
pub(super) fn sign(spec: &AlgorithmSpec, key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let hashed = digest(spec.hash, message);
    let signed = match spec.family {
        Family::RsaPss => key.sign_with_rng(
            &mut rand::rngs::OsRng,
            pss(spec.hash, spec.pss_salt_len()),
            &hashed,
        ),
        _ => key.sign(pkcs1(spec.hash), &hashed),
    };
    signed.map_err(|e| CryptoError::Failed(format!("{} signing failed: {e}", spec.family.name())))
}

pub(super) fn verify(spec: &AlgorithmSpec, key: &RsaPublicKey, signature: &[u8], message: &[u8]) -> bool {
    let hashed = digest(spec.hash, message);
    let verified = match spec.family {
        Family::RsaPss => key.verify(pss(spec.hash, spec.pss_salt_len()), &hashed, signature),
        _ => key.verify(pkcs1(spec.hash), &hashed, signature),
    };
    verified.is_ok()
}

fn pkcs1(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
    }
}

fn pss(hash: HashAlgorithm, salt_len: usize) -> Pss {
    match hash {
        HashAlgorithm::Sha1 => Pss::new_with_salt::<sha1::Sha1>(salt_len),
        HashAlgorithm::Sha256 => Pss::new_with_salt::<sha2::Sha256>(salt_len),
        HashAlgorithm::Sha384 => Pss::new_with_salt::<sha2::Sha384>(salt_len),
        HashAlgorithm::Sha512 => Pss::new_with_salt::<sha2::Sha512>(salt_len),
    }
}

fn encode(value: &BigUint) -> String {
    let bytes = Zeroizing::new(value.to_bytes_be());
    jwk::b64url_encode(&bytes)
}

fn integer(member: &str, value: Option<&String>) -> Result<BigUint, CryptoError> {
    let bytes = Zeroizing::new(jwk::required(member, value)?);
    if bytes.is_empty() {
        return Err(CryptoError::InvalidKey(format!("JWK member `{member}` is empty")));
    }
    Ok(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn private_key() -> RsaPrivateKey {
        match generate(1024).unwrap() {
            KeyHandle::RsaPrivate(key) => *key,
            other => panic!("unexpected handle {other:?}"),
        }
    }

    #[test]
    fn test_export_import_private_roundtrip() {
        let key = private_key();
        let jwk = export_private(&key).unwrap();
        assert!(jwk.dp.is_some() && jwk.dq.is_some() && jwk.qi.is_some());
        match import(&jwk, KeyUsage::Sign).unwrap() {
            KeyHandle::RsaPrivate(imported) => assert_eq!(*imported, key),
            other => panic!("unexpected handle {other:?}"),
        }
    }

    #[test]
    fn test_import_for_verify_uses_public_members_only() {
        let key = private_key();
        let jwk = export_public(&key.to_public_key());
        assert!(jwk.d.is_none());
        assert!(matches!(
            import(&jwk, KeyUsage::Verify).unwrap(),
            KeyHandle::RsaPublic(_)
        ));
        assert!(import(&jwk, KeyUsage::Sign).is_err());
    }

    #[test]
    fn test_pkcs1_is_deterministic() {
        let key = private_key();
        let spec = AlgorithmSpec::rsa_pkcs1(HashAlgorithm::Sha256, 1024);
        let a = sign(&spec, &key, b"message").unwrap();
        let b = sign(&spec, &key, b"message").unwrap();
        assert_eq!(a, b);
        assert!(verify(&spec, &key.to_public_key(), &a, b"message"));
    }

    #[test]
    fn test_pss_salt_must_agree() {
        let key = private_key();
        let spec = AlgorithmSpec::rsa_pss(HashAlgorithm::Sha256, 1024);
        let sig = sign(&spec, &key, b"message").unwrap();
        assert!(verify(&spec, &key.to_public_key(), &sig, b"message"));

        let other_salt = spec.with_salt_length(0);
        assert!(!verify(&other_salt, &key.to_public_key(), &sig, b"message"));
    }

    #[test]
    fn test_rejects_small_modulus() {
        let jwk = Jwk {
            n: Some("AQAB".into()),
            e: Some("AQAB".into()),
            ..Jwk::new("RSA")
        };
        assert!(matches!(
            import(&jwk, KeyUsage::Verify),
            Err(CryptoError::InvalidKey(_))
        ));
    }
}
