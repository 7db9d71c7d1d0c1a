#![allow(clippy::expect_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use tokensign::{generate_jwk, sign, verify, AlgorithmSpec, HashAlgorithm, NamedCurve};

const DATA: &str = "user:42|scope=read,write";
const NOW: u64 = 1_700_000_000_000;

fn bench_spec(c: &mut Criterion, label: &str, spec: AlgorithmSpec) {
    let key = generate_jwk(&spec).expect("keygen");
    let token = sign(&key, DATA, &spec, 600, Some(NOW)).expect("sign");

    c.bench_function(&format!("{label}_sign"), |b| {
        b.iter(|| sign(&key, DATA, &spec, 600, Some(NOW)).expect("sign"));
    });
    c.bench_function(&format!("{label}_verify"), |b| {
        b.iter(|| verify(&key, &token, DATA, &spec, Some(NOW)).expect("verify"));
    });
}

fn bench_hmac(c: &mut Criterion) {
    bench_spec(c, "hmac_sha256", AlgorithmSpec::default());
}

fn bench_ecdsa(c: &mut Criterion) {
    bench_spec(
        c,
        "ecdsa_p256",
        AlgorithmSpec::ecdsa(NamedCurve::P256, HashAlgorithm::Sha256),
    );
}

fn bench_ed25519(c: &mut Criterion) {
    bench_spec(c, "ed25519", AlgorithmSpec::ed25519());
}

fn bench_rsa(c: &mut Criterion) {
    bench_spec(c, "rs256", AlgorithmSpec::rsa_pkcs1(HashAlgorithm::Sha256, 2048));
    bench_spec(c, "ps256", AlgorithmSpec::rsa_pss(HashAlgorithm::Sha256, 2048));
}

fn bench_expired_rejection(c: &mut Criterion) {
    let spec = AlgorithmSpec::default();
    let key = generate_jwk(&spec).expect("keygen");
    let token = sign(&key, DATA, &spec, 1, Some(NOW)).expect("sign");
    c.bench_function("expired_reject", |b| {
        b.iter(|| verify(&key, &token, DATA, &spec, Some(NOW + 10_000)).expect("verify"));
    });
}

criterion_group!(
    benches,
    bench_hmac,
    bench_ecdsa,
    bench_ed25519,
    bench_rsa,
    bench_expired_rejection
);
criterion_main!(benches);
