//! End-to-end sign/verify for every supported algorithm family.

#![allow(clippy::unwrap_used)]

use tokensign::keys::{generate_jwk, read_key_file, write_key_file};
use tokensign::{
    generate_key, sign, verify, AlgorithmSpec, CryptoError, HashAlgorithm, NamedCurve, TokenError,
};

const NOW: u64 = 1_700_000_000_000;

// RSA keys are kept at the minimum size so the suite stays fast in debug builds.
fn all_specs() -> Vec<AlgorithmSpec> {
    vec![
        AlgorithmSpec::hmac(HashAlgorithm::Sha1),
        AlgorithmSpec::hmac(HashAlgorithm::Sha256),
        AlgorithmSpec::hmac(HashAlgorithm::Sha384),
        AlgorithmSpec::hmac(HashAlgorithm::Sha512),
        AlgorithmSpec::rsa_pkcs1(HashAlgorithm::Sha256, 1024),
        AlgorithmSpec::rsa_pss(HashAlgorithm::Sha256, 1024),
        AlgorithmSpec::rsa_pss(HashAlgorithm::Sha384, 1024).with_salt_length(0),
        AlgorithmSpec::ecdsa(NamedCurve::P256, HashAlgorithm::Sha256),
        AlgorithmSpec::ecdsa(NamedCurve::P384, HashAlgorithm::Sha384),
        AlgorithmSpec::ecdsa(NamedCurve::P256, HashAlgorithm::Sha512),
        AlgorithmSpec::ed25519(),
    ]
}

#[test]
fn test_roundtrip_every_family() {
    for spec in all_specs() {
        let key = generate_jwk(&spec).unwrap();
        let token = sign(&key, "payload", &spec, 0, None).unwrap();
        assert!(!token.contains("::"), "{spec}");
        assert!(verify(&key, &token, "payload", &spec, None).unwrap(), "{spec} rejected");
        assert!(!verify(&key, &token, "payloaD", &spec, None).unwrap(), "{spec} accepted");
    }
}

#[test]
fn test_expiry_every_family() {
    for spec in all_specs() {
        let key = generate_jwk(&spec).unwrap();
        let token = sign(&key, "payload", &spec, 60, Some(NOW)).unwrap();
        assert!(token.ends_with("::1700000060"), "{spec}: {token}");
        assert!(verify(&key, &token, "payload", &spec, Some(NOW)).unwrap(), "{spec}");
        assert!(verify(&key, &token, "payload", &spec, Some(NOW + 60_000)).unwrap(), "{spec}");
        assert!(!verify(&key, &token, "payload", &spec, Some(NOW + 60_001)).unwrap(), "{spec}");

        let extended = token.replace("::1700000060", "::1700000061");
        assert!(!verify(&key, &extended, "payload", &spec, Some(NOW)).unwrap(), "{spec}");
    }
}

#[test]
fn test_public_key_verifies_but_cannot_sign() {
    for spec in all_specs().into_iter().filter(|s| s.family != tokensign::Family::Hmac) {
        let private = generate_jwk(&spec).unwrap();
        let public = private.to_public().unwrap();
        assert!(!public.is_private());

        let token = sign(&private, "payload", &spec, 0, None).unwrap();
        assert!(verify(&public, &token, "payload", &spec, None).unwrap(), "{spec}");
        assert!(matches!(
            sign(&public, "payload", &spec, 0, None),
            Err(TokenError::Signing(_))
        ));
    }
}

#[test]
fn test_wrong_key_is_false() {
    for spec in all_specs() {
        let key = generate_jwk(&spec).unwrap();
        let other = generate_jwk(&spec).unwrap();
        let token = sign(&key, "payload", &spec, 0, None).unwrap();
        assert!(!verify(&other, &token, "payload", &spec, None).unwrap(), "{spec}");
    }
}

#[test]
fn test_cross_algorithm_is_false() {
    let hmac = AlgorithmSpec::default();
    let ecdsa = AlgorithmSpec::ecdsa(NamedCurve::P256, HashAlgorithm::Sha256);
    let ed25519 = AlgorithmSpec::ed25519();

    let hmac_key = generate_jwk(&hmac).unwrap();
    let ec_key = generate_jwk(&ecdsa).unwrap();
    let token = sign(&ec_key, "payload", &ecdsa, 0, None).unwrap();

    assert!(!verify(&ec_key, &token, "payload", &ed25519, None).unwrap());
    assert!(!verify(&hmac_key, &token, "payload", &ecdsa, None).unwrap());
    assert!(!verify(&ec_key, &token, "payload", &hmac, None).unwrap());
    // Same curve, different digest: the key is compatible, the signature is not.
    let sha384 = AlgorithmSpec::ecdsa(NamedCurve::P256, HashAlgorithm::Sha384);
    assert!(!verify(&ec_key, &token, "payload", &sha384, None).unwrap());
    // Key for P-256 presented as P-384.
    let p384 = AlgorithmSpec::ecdsa(NamedCurve::P384, HashAlgorithm::Sha384);
    assert!(!verify(&ec_key, &token, "payload", &p384, None).unwrap());
}

#[test]
fn test_deterministic_families() {
    for spec in all_specs().into_iter().filter(|s| s.family != tokensign::Family::RsaPss) {
        let key = generate_jwk(&spec).unwrap();
        let a = sign(&key, "payload", &spec, 0, None).unwrap();
        let b = sign(&key, "payload", &spec, 0, None).unwrap();
        assert_eq!(a, b, "{spec}");
    }
}

#[test]
fn test_pss_is_randomized() {
    let spec = AlgorithmSpec::rsa_pss(HashAlgorithm::Sha256, 1024);
    let key = generate_jwk(&spec).unwrap();
    let a = sign(&key, "payload", &spec, 0, None).unwrap();
    let b = sign(&key, "payload", &spec, 0, None).unwrap();
    assert_ne!(a, b);
    assert!(verify(&key, &a, "payload", &spec, None).unwrap());
    assert!(verify(&key, &b, "payload", &spec, None).unwrap());
}

#[test]
fn test_key_files_roundtrip_each_format() {
    let dir = tempfile::tempdir().unwrap();
    for (i, spec) in all_specs().into_iter().enumerate() {
        for ext in ["json", "js"] {
            let path = dir.path().join(format!("key{i}.{ext}"));
            let key = generate_key(&path, &spec).unwrap();
            let loaded = read_key_file(&path).unwrap();
            assert_eq!(loaded, key, "{spec} .{ext}");

            let token = sign(&loaded, "payload", &spec, 0, None).unwrap();
            assert!(verify(&key, &token, "payload", &spec, None).unwrap());
        }
    }
}

#[test]
fn test_public_key_file() {
    let dir = tempfile::tempdir().unwrap();
    let spec = AlgorithmSpec::ecdsa(NamedCurve::P384, HashAlgorithm::Sha384);
    let private = generate_key(dir.path().join("private.json"), &spec).unwrap();
    let public_path = dir.path().join("public.mjs");
    write_key_file(&public_path, &private.to_public().unwrap()).unwrap();

    let public = read_key_file(&public_path).unwrap();
    let token = sign(&private, "payload", &spec, 600, None).unwrap();
    assert!(verify(&public, &token, "payload", &spec, None).unwrap());
}

#[test]
fn test_invalid_specs_rejected() {
    let invalid = [
        AlgorithmSpec::rsa_pkcs1(HashAlgorithm::Sha256, 512),
        AlgorithmSpec::rsa_pkcs1(HashAlgorithm::Sha256, 2049),
        AlgorithmSpec::rsa_pss(HashAlgorithm::Sha512, 1024).with_salt_length(64),
        AlgorithmSpec::ecdsa(NamedCurve::P384, HashAlgorithm::Sha1),
        AlgorithmSpec::hmac(HashAlgorithm::Sha256).with_salt_length(32),
        AlgorithmSpec {
            curve: Some(NamedCurve::P256),
            ..AlgorithmSpec::ed25519()
        },
    ];
    let key = generate_jwk(&AlgorithmSpec::default()).unwrap();
    for spec in invalid {
        assert!(
            matches!(generate_jwk(&spec), Err(TokenError::KeyGeneration(CryptoError::Unsupported(_)))),
            "{spec}"
        );
        assert!(matches!(
            sign(&key, "payload", &spec, 0, None),
            Err(TokenError::Signing(CryptoError::Unsupported(_)))
        ));
        assert!(matches!(
            verify(&key, "AAAA", "payload", &spec, None),
            Err(TokenError::Verification(CryptoError::Unsupported(_)))
        ));
    }
}
