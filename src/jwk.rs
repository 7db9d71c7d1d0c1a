//! Portable key representation (JSON Web Key) and the two key-file text
//! formats it is persisted in.
//!
//! A `.json` destination receives the JWK as compact JSON. Any other
//! destination receives the same JSON wrapped as a module default export:
//!
//! ```text
//! export default {"kty":"oct","alg":"HS256","key_ops":["sign","verify"],"ext":true,"k":"..."}
//! ```

use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, TokenError};

const DEFAULT_EXPORT_PREFIX: &str = "export default";

pub const KEY_OP_SIGN: &str = "sign";
pub const KEY_OP_VERIFY: &str = "verify";

/// A JSON Web Key. Binary members hold base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: `oct`, `RSA`, `EC` or `OKP`.
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
    /// Symmetric secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
    /// RSA modulus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Private exponent (RSA) or private scalar/seed (EC, OKP).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
    /// EC x coordinate or OKP public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// EC y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// An empty key of the given type; members are filled in by the provider.
    pub fn new(kty: &str) -> Self {
        Jwk {
            kty: kty.to_string(),
            alg: None,
            crv: None,
            key_ops: None,
            ext: None,
            k: None,
            n: None,
            e: None,
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
            x: None,
            y: None,
        }
    }

    /// True when the key carries secret material and can sign.
    pub fn is_private(&self) -> bool {
        self.k.is_some() || self.d.is_some()
    }

    /// True when `key_ops` is absent or lists `op`.
    pub fn permits(&self, op: &str) -> bool {
        self.key_ops
            .as_ref()
            .map_or(true, |ops| ops.iter().any(|o| o == op))
    }

    /// Strip private members, leaving a key that can only verify.
    pub fn to_public(&self) -> Result<Jwk, TokenError> {
        if self.kty == "oct" {
            return Err(TokenError::KeyFile(
                "symmetric (oct) keys have no public part".into(),
            ));
        }
        Ok(Jwk {
            key_ops: Some(vec![KEY_OP_VERIFY.to_string()]),
            k: None,
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
            ..self.clone()
        })
    }
}

/// Whether a destination receives raw JSON rather than a default export.
pub fn is_json_destination(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Render a JWK in the text format chosen by the destination's extension.
pub fn render_key_file(path: &Path, jwk: &Jwk) -> Result<String, TokenError> {
    let json = serde_json::to_string(jwk)
        .map_err(|e| TokenError::KeyFile(format!("cannot encode key: {e}")))?;
    if is_json_destination(path) {
        Ok(json)
    } else {
        Ok(format!("{DEFAULT_EXPORT_PREFIX} {json}"))
    }
}

/// Parse either key-file format back into a JWK.
pub fn parse_key_file(text: &str) -> Result<Jwk, TokenError> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix(DEFAULT_EXPORT_PREFIX) {
        body = rest.trim();
        body = body.strip_suffix(';').unwrap_or(body).trim_end();
    }
    serde_json::from_str(body).map_err(|e| TokenError::KeyFile(format!("invalid JWK: {e}")))
}

pub(crate) fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn b64url_decode(member: &str, value: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| CryptoError::InvalidKey(format!("JWK member `{member}` is not base64url: {e}")))
}

/// Decode a member that must be present.
pub(crate) fn required(member: &str, value: Option<&String>) -> Result<Vec<u8>, CryptoError> {
    let value =
        value.ok_or_else(|| CryptoError::InvalidKey(format!("JWK is missing `{member}`")))?;
    b64url_decode(member, value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Jwk {
        Jwk {
            alg: Some("HS256".into()),
            key_ops: Some(vec!["sign".into(), "verify".into()]),
            ext: Some(true),
            k: Some("c2VjcmV0".into()),
            ..Jwk::new("oct")
        }
    }

    #[test]
    fn test_json_destination_detection() {
        assert!(is_json_destination(Path::new("keys/sign.json")));
        assert!(!is_json_destination(Path::new("keys/sign.js")));
        assert!(!is_json_destination(Path::new("keys/signjson")));
    }

    #[test]
    fn test_render_json() {
        let text = render_key_file(Path::new("k.json"), &sample()).unwrap();
        assert!(text.starts_with('{'));
        assert_eq!(parse_key_file(&text).unwrap(), sample());
    }

    #[test]
    fn test_render_default_export() {
        let text = render_key_file(Path::new("k.mjs"), &sample()).unwrap();
        assert!(text.starts_with("export default {"));
        assert_eq!(parse_key_file(&text).unwrap(), sample());
    }

    #[test]
    fn test_parse_tolerates_semicolon_and_whitespace() {
        let text = "\n export default {\"kty\":\"oct\",\"k\":\"c2VjcmV0\"};\n";
        let jwk = parse_key_file(text).unwrap();
        assert_eq!(jwk.kty, "oct");
        assert_eq!(jwk.k.as_deref(), Some("c2VjcmV0"));
    }

    #[test]
    fn test_parse_ignores_unknown_members() {
        let jwk = parse_key_file(r#"{"kty":"EC","crv":"P-256","x":"AA","y":"AA","kid":"k1"}"#)
            .unwrap();
        assert_eq!(jwk.crv.as_deref(), Some("P-256"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_key_file("export default"), Err(TokenError::KeyFile(_))));
        assert!(parse_key_file("module.exports = {}").is_err());
    }

    #[test]
    fn test_omits_absent_members() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("d"));
        assert!(!obj.contains_key("crv"));
    }

    #[test]
    fn test_to_public_strips_private_members() {
        let jwk = Jwk {
            crv: Some("P-256".into()),
            x: Some("eA".into()),
            y: Some("eQ".into()),
            d: Some("ZA".into()),
            key_ops: Some(vec!["sign".into(), "verify".into()]),
            ..Jwk::new("EC")
        };
        let public = jwk.to_public().unwrap();
        assert!(!public.is_private());
        assert_eq!(public.x, jwk.x);
        assert!(public.permits(KEY_OP_VERIFY));
        assert!(!public.permits(KEY_OP_SIGN));
    }

    #[test]
    fn test_to_public_rejects_symmetric() {
        assert!(sample().to_public().is_err());
    }

    #[test]
    fn test_permits_without_key_ops() {
        assert!(Jwk::new("oct").permits(KEY_OP_SIGN));
    }
}
