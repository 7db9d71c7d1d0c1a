#![no_main]
use libfuzzer_sys::fuzz_target;
use tokensign::crypto::{import_key, KeyUsage};
use tokensign::jwk::parse_key_file;
use tokensign::{AlgorithmSpec, HashAlgorithm, NamedCurve};

/// Parse arbitrary key files and push whatever parses through every importer.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(jwk) = parse_key_file(text) else {
        return;
    };
    let _ = jwk.to_public();
    for spec in [
        AlgorithmSpec::default(),
        AlgorithmSpec::rsa_pkcs1(HashAlgorithm::Sha256, 2048),
        AlgorithmSpec::ecdsa(NamedCurve::P256, HashAlgorithm::Sha256),
        AlgorithmSpec::ed25519(),
    ] {
        let _ = import_key(&jwk, &spec, KeyUsage::Verify);
        let _ = import_key(&jwk, &spec, KeyUsage::Sign);
    }
});
