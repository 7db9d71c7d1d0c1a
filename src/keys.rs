//! Key generation and key-file persistence.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::crypto;
use crate::error::TokenError;
use crate::jwk::{parse_key_file, render_key_file, Jwk};
use crate::types::AlgorithmSpec;

/// Generate a fresh key under `algorithm` and export it, without touching
/// the filesystem.
pub fn generate_jwk(algorithm: &AlgorithmSpec) -> Result<Jwk, TokenError> {
    let handle = crypto::generate_key(algorithm).map_err(TokenError::KeyGeneration)?;
    crypto::export_key(&handle, algorithm).map_err(TokenError::KeyGeneration)
}

/// Generate a key able to sign and verify, write it to `destination` and
/// return it.
///
/// A destination ending in `.json` receives raw JSON; anything else receives
/// an `export default` module. An existing file is overwritten.
pub fn generate_key(
    destination: impl AsRef<Path>,
    algorithm: &AlgorithmSpec,
) -> Result<Jwk, TokenError> {
    let jwk = generate_jwk(algorithm)?;
    write_key_file(destination, &jwk)?;
    Ok(jwk)
}

/// Write `jwk` to `path` in the format its extension selects.
pub fn write_key_file(path: impl AsRef<Path>, jwk: &Jwk) -> Result<(), TokenError> {
    let path = path.as_ref();
    let text = render_key_file(path, jwk)?;
    fs::write(path, text)?;
    info!(path = %path.display(), kty = %jwk.kty, private = jwk.is_private(), "wrote key file");
    Ok(())
}

/// Read a key file in either format.
pub fn read_key_file(path: impl AsRef<Path>) -> Result<Jwk, TokenError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let jwk = parse_key_file(&text)?;
    debug!(path = %path.display(), kty = %jwk.kty, "read key file");
    Ok(jwk)
}
