use std::path::Path;
use std::time::Duration;

use crate::error::{CryptoError, TokenError};
use crate::jwk::Jwk;
use crate::keys::{generate_key, read_key_file};
use crate::types::AlgorithmSpec;
use crate::{sign, verify};

/// A key bound to the algorithm it signs and verifies under.
///
/// ```no_run
/// use tokensign::{AlgorithmSpec, TokenSigner};
/// use std::time::Duration;
///
/// let signer = TokenSigner::generate("signing-key.json", AlgorithmSpec::default())?;
/// let token = signer.sign_with_expiry("user:42", Duration::from_secs(600))?;
/// assert!(signer.verify(&token, "user:42")?);
/// # Ok::<(), tokensign::TokenError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSigner {
    key: Jwk,
    algorithm: AlgorithmSpec,
}

impl TokenSigner {
    pub fn new(key: Jwk, algorithm: AlgorithmSpec) -> Self {
        TokenSigner { key, algorithm }
    }

    /// Generate a key, persist it to `destination` and bind it.
    pub fn generate(destination: impl AsRef<Path>, algorithm: AlgorithmSpec) -> Result<Self, TokenError> {
        let key = generate_key(destination, &algorithm)?;
        Ok(TokenSigner::new(key, algorithm))
    }

    pub fn from_key_file(path: impl AsRef<Path>, algorithm: AlgorithmSpec) -> Result<Self, TokenError> {
        Ok(TokenSigner::new(read_key_file(path)?, algorithm))
    }

    pub fn key(&self) -> &Jwk {
        &self.key
    }

    pub fn algorithm(&self) -> &AlgorithmSpec {
        &self.algorithm
    }

    /// A token that never expires.
    pub fn sign(&self, data: &str) -> Result<String, TokenError> {
        sign::sign(&self.key, data, &self.algorithm, 0, None)
    }

    /// A token valid for `ttl` from now. Expiries have whole-second
    /// resolution, so a sub-second `ttl` is rounded up to one second. A zero
    /// `ttl` is rejected rather than producing a token that never expires.
    pub fn sign_with_expiry(&self, data: &str, ttl: Duration) -> Result<String, TokenError> {
        sign::sign(&self.key, data, &self.algorithm, lifetime_secs(ttl)?, None)
    }

    pub fn verify(&self, token: &str, data: &str) -> Result<bool, TokenError> {
        verify::verify(&self.key, token, data, &self.algorithm, None)
    }

    /// Verify as of `now_ms` milliseconds since the Unix epoch (0 reads the
    /// system clock).
    pub fn verify_at(&self, token: &str, data: &str, now_ms: u64) -> Result<bool, TokenError> {
        verify::verify(&self.key, token, data, &self.algorithm, Some(now_ms))
    }
}

fn lifetime_secs(ttl: Duration) -> Result<u64, TokenError> {
    if ttl.is_zero() {
        return Err(TokenError::Signing(CryptoError::Unsupported(
            "token lifetime must be non-zero".into(),
        )));
    }
    Ok(ttl.as_secs().max(1))
}
