//! Webhook signature validation.
//!
//! GitHub signs each delivery with HMAC-SHA1 over the raw request body, keyed
//! with the app's webhook secret, and sends the result in `X-Hub-Signature`
//! as `sha1=<lowercase hex>`. The comparison is constant-time.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ValidationError;

type HmacSha1 = Hmac<Sha1>;

/// Algorithm prefix GitHub uses in `X-Hub-Signature`.
pub const SIGNATURE_ALGORITHM: &str = "sha1";

/// Shared secret configured on the GitHub App for signing webhook deliveries.
///
/// Zeroed on drop and redacted in Debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for WebhookSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for WebhookSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

// Security: Don't expose the secret in debug output
impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<REDACTED>)")
    }
}

/// Validates GitHub webhook signatures using HMAC-SHA1.
///
/// # Security
///
/// - Uses constant-time comparison to prevent timing attacks
/// - Never logs secrets or signature values
///
/// # Examples
///
/// ```rust
/// use hook_router_core::webhook::{sign_payload, SignatureValidator, WebhookSecret};
///
/// let validator = SignatureValidator::new(WebhookSecret::from("topsecret"));
/// let payload = br#"{"action":"opened"}"#;
/// let header = sign_payload(b"topsecret", payload).unwrap();
///
/// assert!(validator.validate(payload, &header).unwrap());
/// assert!(!validator.validate(b"tampered", &header).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct SignatureValidator {
    secret: WebhookSecret,
}

impl SignatureValidator {
    pub fn new(secret: WebhookSecret) -> Self {
        Self { secret }
    }

    /// Validate a webhook signature header against the raw payload.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Signature is valid
    /// * `Ok(false)` - Signature does not match (tampered payload or wrong secret)
    /// * `Err` - The header is malformed
    pub fn validate(&self, payload: &[u8], signature: &str) -> Result<bool, ValidationError> {
        verify_signature(self.secret.as_bytes(), payload, signature)
    }
}

/// Check `signature_header` (`<algorithm>=<hex digest>`) against the
/// HMAC-SHA1 of `payload` under `secret`.
///
/// The algorithm prefix is not checked; the digest is always compared as
/// HMAC-SHA1. Hex comparison is case-sensitive, matching GitHub's lowercase
/// output.
///
/// # Errors
///
/// Returns `ValidationError::InvalidFormat` if the header has no `=`, more
/// than one `=`, or an empty digest.
pub fn verify_signature(
    secret: &[u8],
    payload: &[u8],
    signature_header: &str,
) -> Result<bool, ValidationError> {
    let (algorithm, provided) = parse_signature(signature_header)?;
    if algorithm != SIGNATURE_ALGORITHM {
        debug!(
            algorithm = algorithm,
            "Signature algorithm prefix is not sha1, comparing as HMAC-SHA1"
        );
    }

    let expected = compute_hex_digest(secret, payload)?;
    Ok(constant_time_compare(provided.as_bytes(), expected.as_bytes()))
}

/// Lowercase hex HMAC-SHA1 digest of `payload` under `secret`.
pub fn compute_hex_digest(secret: &[u8], payload: &[u8]) -> Result<String, ValidationError> {
    let mut mac =
        HmacSha1::new_from_slice(secret).map_err(|e| ValidationError::InvalidFormat {
            field: "webhook_secret".to_string(),
            message: format!("Invalid HMAC key: {}", e),
        })?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Produce the `X-Hub-Signature` header value GitHub would send for `payload`.
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> Result<String, ValidationError> {
    Ok(format!(
        "{}={}",
        SIGNATURE_ALGORITHM,
        compute_hex_digest(secret, payload)?
    ))
}

fn parse_signature(header: &str) -> Result<(&str, &str), ValidationError> {
    let (algorithm, digest) = header
        .split_once('=')
        .ok_or_else(|| invalid_signature_format("expected '<algorithm>=<digest>'"))?;

    if digest.contains('=') {
        return Err(invalid_signature_format("more than one '=' separator"));
    }
    if digest.is_empty() {
        return Err(invalid_signature_format("digest is empty"));
    }

    Ok((algorithm, digest))
}

fn invalid_signature_format(message: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "X-Hub-Signature".to_string(),
        message: message.to_string(),
    }
}

// A length mismatch returns early; digest length is not secret.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
