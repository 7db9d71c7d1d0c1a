use thiserror::Error;

/// Failures raised by the primitive provider (`crate::crypto`).
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported algorithm: {0}")]
    Unsupported(String),

    #[error("key does not match algorithm: {0}")]
    AlgorithmMismatch(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("primitive operation failed: {0}")]
    Failed(String),
}

/// Errors surfaced to callers of `generate_key`, `sign` and `verify`.
///
/// A token that fails verification is not an error: `verify` reports it as
/// `Ok(false)`. Variants wrapping another error keep its detail in
/// `source()` rather than repeating it in their own message.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("key generation failed")]
    KeyGeneration(#[source] CryptoError),

    #[error("key file I/O failed")]
    Io(#[from] std::io::Error),

    #[error("signing failed")]
    Signing(#[source] CryptoError),

    #[error("verification failed")]
    Verification(#[source] CryptoError),

    #[error("malformed key file: {0}")]
    KeyFile(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_wrapped_detail_appears_once_in_chain() {
        let err = TokenError::Signing(CryptoError::Unsupported("ECDSA requires a named curve".into()));
        assert_eq!(err.to_string(), "signing failed");
        assert_eq!(
            err.source().unwrap().to_string(),
            "unsupported algorithm: ECDSA requires a named curve"
        );

        let io = TokenError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(!io.to_string().contains("missing"));
        assert_eq!(io.source().unwrap().to_string(), "missing");
    }
}
