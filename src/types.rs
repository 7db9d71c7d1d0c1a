use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Separator between the base64 signature and the expiry in a token.
pub const EXPIRY_DELIMITER: &str = "::";

/// RSA modulus length used when `AlgorithmSpec::modulus_length` is unset.
pub const DEFAULT_MODULUS_LENGTH: u32 = 2048;

/// Smallest RSA modulus accepted for generation or import.
pub const MIN_MODULUS_LENGTH: u32 = 1024;

/// Largest RSA modulus accepted for generation or import.
pub const MAX_MODULUS_LENGTH: u32 = 16384;

/// Public exponent of generated RSA keys.
pub const RSA_PUBLIC_EXPONENT: u64 = 65537;

/// Ed25519 seed and public key length.
pub const ED25519_KEY_LEN: usize = 32;

/// Signature algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "HMAC")]
    Hmac,
    #[serde(rename = "RSASSA-PKCS1-v1_5")]
    RsaPkcs1,
    #[serde(rename = "RSA-PSS")]
    RsaPss,
    #[serde(rename = "ECDSA")]
    Ecdsa,
    #[serde(rename = "Ed25519")]
    Ed25519,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Hmac => "HMAC",
            Family::RsaPkcs1 => "RSASSA-PKCS1-v1_5",
            Family::RsaPss => "RSA-PSS",
            Family::Ecdsa => "ECDSA",
            Family::Ed25519 => "Ed25519",
        }
    }

    pub fn is_rsa(self) -> bool {
        matches!(self, Family::RsaPkcs1 | Family::RsaPss)
    }
}

/// Digest used by the signature (ignored by Ed25519).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA-1")]
    Sha1,
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-384")]
    Sha384,
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Digest output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Internal block length in bytes; also the length of generated HMAC secrets.
    pub fn block_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 | HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha384 | HashAlgorithm::Sha512 => 128,
        }
    }

    /// Digest-size suffix used in JWK `alg` names (`HS256`, `PS1`, ...).
    fn jwk_suffix(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "1",
            HashAlgorithm::Sha256 => "256",
            HashAlgorithm::Sha384 => "384",
            HashAlgorithm::Sha512 => "512",
        }
    }
}

/// Named curve for ECDSA keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
}

impl NamedCurve {
    pub fn name(self) -> &'static str {
        match self {
            NamedCurve::P256 => "P-256",
            NamedCurve::P384 => "P-384",
        }
    }

    /// Length of a field element (and of each signature half) in bytes.
    pub fn field_len(self) -> usize {
        match self {
            NamedCurve::P256 => 32,
            NamedCurve::P384 => 48,
        }
    }
}

/// A signature algorithm plus its parameters.
///
/// The same value must be supplied to [`sign`](crate::sign::sign) and
/// [`verify`](crate::verify::verify); tokens carry no algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmSpec {
    #[serde(rename = "name")]
    pub family: Family,
    pub hash: HashAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "namedCurve")]
    pub curve: Option<NamedCurve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_length: Option<u32>,
}

impl Default for AlgorithmSpec {
    fn default() -> Self {
        AlgorithmSpec::hmac(HashAlgorithm::Sha256)
    }
}

impl AlgorithmSpec {
    pub fn hmac(hash: HashAlgorithm) -> Self {
        AlgorithmSpec {
            family: Family::Hmac,
            hash,
            curve: None,
            modulus_length: None,
            salt_length: None,
        }
    }

    pub fn rsa_pkcs1(hash: HashAlgorithm, modulus_length: u32) -> Self {
        AlgorithmSpec {
            family: Family::RsaPkcs1,
            hash,
            curve: None,
            modulus_length: Some(modulus_length),
            salt_length: None,
        }
    }

    /// RSA-PSS with the salt length defaulting to the digest length.
    pub fn rsa_pss(hash: HashAlgorithm, modulus_length: u32) -> Self {
        AlgorithmSpec {
            family: Family::RsaPss,
            hash,
            curve: None,
            modulus_length: Some(modulus_length),
            salt_length: None,
        }
    }

    pub fn ecdsa(curve: NamedCurve, hash: HashAlgorithm) -> Self {
        AlgorithmSpec {
            family: Family::Ecdsa,
            hash,
            curve: Some(curve),
            modulus_length: None,
            salt_length: None,
        }
    }

    pub fn ed25519() -> Self {
        AlgorithmSpec {
            family: Family::Ed25519,
            hash: HashAlgorithm::Sha512,
            curve: None,
            modulus_length: None,
            salt_length: None,
        }
    }

    #[must_use]
    pub fn with_salt_length(mut self, salt_length: u32) -> Self {
        self.salt_length = Some(salt_length);
        self
    }

    pub fn modulus_bits(&self) -> u32 {
        self.modulus_length.unwrap_or(DEFAULT_MODULUS_LENGTH)
    }

    /// Effective RSA-PSS salt length in bytes.
    pub fn pss_salt_len(&self) -> usize {
        self.salt_length
            .map_or(self.hash.output_len(), |len| len as usize)
    }

    /// The JWK `alg` member implied by these parameters, when there is one.
    /// ECDSA and Ed25519 keys are not bound to a digest and carry none.
    pub fn jwk_alg(&self) -> Option<String> {
        let prefix = match self.family {
            Family::Hmac => "HS",
            Family::RsaPkcs1 => "RS",
            Family::RsaPss => "PS",
            Family::Ecdsa | Family::Ed25519 => return None,
        };
        Some(format!("{prefix}{}", self.hash.jwk_suffix()))
    }

    /// Reject parameter combinations no provider operation can honour.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.salt_length.is_some() && self.family != Family::RsaPss {
            return Err(CryptoError::Unsupported(format!(
                "salt length is only meaningful for RSA-PSS, not {}",
                self.family.name()
            )));
        }

        match self.family {
            Family::Hmac | Family::Ed25519 => {
                if self.curve.is_some() || self.modulus_length.is_some() {
                    return Err(CryptoError::Unsupported(format!(
                        "{} takes neither a curve nor a modulus length",
                        self.family.name()
                    )));
                }
            }
            Family::RsaPkcs1 | Family::RsaPss => {
                if self.curve.is_some() {
                    return Err(CryptoError::Unsupported(format!(
                        "{} does not take a named curve",
                        self.family.name()
                    )));
                }
                let bits = self.modulus_bits();
                if !(MIN_MODULUS_LENGTH..=MAX_MODULUS_LENGTH).contains(&bits) || bits % 8 != 0 {
                    return Err(CryptoError::Unsupported(format!(
                        "RSA modulus length {bits} outside {MIN_MODULUS_LENGTH}..={MAX_MODULUS_LENGTH} or not a multiple of 8"
                    )));
                }
                if self.family == Family::RsaPss {
                    let max_salt = (bits as usize / 8)
                        .saturating_sub(self.hash.output_len())
                        .saturating_sub(2);
                    if self.pss_salt_len() > max_salt {
                        return Err(CryptoError::Unsupported(format!(
                            "RSA-PSS salt length {} exceeds {max_salt} for a {bits}-bit modulus with {}",
                            self.pss_salt_len(),
                            self.hash.name()
                        )));
                    }
                }
            }
            Family::Ecdsa => {
                let curve = self.curve.ok_or_else(|| {
                    CryptoError::Unsupported("ECDSA requires a named curve".into())
                })?;
                if self.modulus_length.is_some() {
                    return Err(CryptoError::Unsupported(
                        "ECDSA does not take a modulus length".into(),
                    ));
                }
                if self.hash.output_len() < curve.field_len() / 2 {
                    return Err(CryptoError::Unsupported(format!(
                        "{} digest is too short for ECDSA over {}",
                        self.hash.name(),
                        curve.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            Family::Ed25519 => f.write_str("Ed25519"),
            Family::Ecdsa => match self.curve {
                Some(curve) => write!(f, "ECDSA/{}/{}", curve.name(), self.hash.name()),
                None => write!(f, "ECDSA/{}", self.hash.name()),
            },
            Family::Hmac => write!(f, "HMAC/{}", self.hash.name()),
            Family::RsaPkcs1 | Family::RsaPss => write!(
                f,
                "{}/{}/{}",
                self.family.name(),
                self.hash.name(),
                self.modulus_bits()
            ),
        }
    }
}

/// Case-insensitive name matching that ignores `-` and `_`.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for Family {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "hmac" => Ok(Family::Hmac),
            "rsassapkcs1v1.5" | "rsassapkcs1v15" | "rsapkcs1" | "rs" => Ok(Family::RsaPkcs1),
            "rsapss" | "pss" | "ps" => Ok(Family::RsaPss),
            "ecdsa" | "es" => Ok(Family::Ecdsa),
            "ed25519" | "eddsa" => Ok(Family::Ed25519),
            _ => Err(CryptoError::Unsupported(format!("unknown algorithm: {s}"))),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(CryptoError::Unsupported(format!("unknown hash: {s}"))),
        }
    }
}

impl FromStr for NamedCurve {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "p256" | "secp256r1" | "prime256v1" => Ok(NamedCurve::P256),
            "p384" | "secp384r1" => Ok(NamedCurve::P384),
            "p521" | "secp521r1" => Err(CryptoError::Unsupported(
                "P-521 is not supported; use P-256 or P-384".into(),
            )),
            _ => Err(CryptoError::Unsupported(format!("unknown curve: {s}"))),
        }
    }
}
