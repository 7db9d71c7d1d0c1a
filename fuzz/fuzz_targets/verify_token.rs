#![no_main]
use libfuzzer_sys::fuzz_target;
use tokensign::jwk::parse_key_file;
use tokensign::{verify, AlgorithmSpec};

const KEY: &str = r#"{"kty":"oct","alg":"HS256","key_ops":["sign","verify"],"k":"ALhJbC1Spav8eSbMJxXe2yR0ZZ-eXneYGaYM51ti1T5pGT9QxYlS6YqQD5Asm4VrVjyTmZLQ00ID1vmn-91ckg","ext":true}"#;

/// Arbitrary tokens under a valid key never panic and never error. A well-formed
/// token can legitimately verify, so only the `Ok` is asserted.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(key) = parse_key_file(KEY) else {
        return;
    };
    let (token, payload) = input.split_once('\n').unwrap_or((input, "hello"));
    let result = verify(&key, token, payload, &AlgorithmSpec::default(), Some(1_563_669_060_000));
    assert!(result.is_ok(), "verification errored on {token:?}: {result:?}");
});
