#![no_main]
use libfuzzer_sys::fuzz_target;
use tokensign::inspect_token;

fuzz_target!(|data: &[u8]| {
    // Must never panic, regardless of input.
    if let Ok(token) = std::str::from_utf8(data) {
        if let Ok(info) = inspect_token(token) {
            let _ = serde_json::to_string(&info);
        }
    }
});
