//! Tokensign: minimal signed tokens with an authenticated expiry.
//!
//! A token is `base64(signature)[::<unix-seconds>]`. Keys are JSON Web Keys
//! persisted either as raw JSON or as an `export default` module. Supports
//! HMAC, RSASSA-PKCS1-v1_5, RSA-PSS, ECDSA (P-256, P-384) and Ed25519.

pub mod crypto;
pub mod error;
pub mod jwk;
pub mod keys;
pub mod sign;
pub mod signer;
pub mod types;
pub mod verify;

pub use error::{CryptoError, TokenError};
pub use jwk::Jwk;
pub use keys::{generate_jwk, generate_key, read_key_file, write_key_file};
pub use sign::sign;
pub use signer::TokenSigner;
pub use types::{AlgorithmSpec, Family, HashAlgorithm, NamedCurve};
pub use verify::{inspect_token, verify, TokenInfo};
