//! GitHub App identity and credential types.
//!
//! This module provides the types webhook handlers use to act on GitHub:
//! - ID types ([`GitHubAppId`], [`InstallationId`])
//! - The app's RSA signing key ([`PrivateKey`])
//! - Token types ([`JsonWebToken`], [`InstallationToken`])
//! - [`GitHubApp`], which turns the app's credentials into API clients

use chrono::{DateTime, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ValidationError;

pub mod client;
pub mod jwt;

pub use client::{ClientAuth, GitHubApp, GitHubClient, DEFAULT_API_URL};
pub use jwt::{JwtGenerator, RS256JwtGenerator};

// ============================================================================
// Core ID Types
// ============================================================================

/// GitHub App identifier assigned during app registration.
///
/// Used as the issuer of the app JWT.
///
/// # Examples
///
/// ```
/// use hook_router_core::auth::GitHubAppId;
///
/// let app_id = GitHubAppId::new(123456);
/// assert_eq!(app_id.as_u64(), 123456);
/// assert_eq!(app_id.to_string(), "123456");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubAppId(u64);

impl GitHubAppId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GitHubAppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GitHubAppId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive_id(s, "github_app_id").map(Self::new)
    }
}

/// Identifier of one installation of the app on an account.
///
/// Webhook payloads for installation-scoped events carry it in
/// `installation.id`.
///
/// # Examples
///
/// ```
/// use hook_router_core::auth::InstallationId;
///
/// let installation: InstallationId = "98765".parse().unwrap();
/// assert_eq!(installation.as_u64(), 98765);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallationId(u64);

impl InstallationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstallationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstallationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive_id(s, "installation_id").map(Self::new)
    }
}

fn parse_positive_id(s: &str, field: &str) -> Result<u64, ValidationError> {
    match s.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            message: "must be a positive integer".to_string(),
        }),
    }
}

// ============================================================================
// Private Key
// ============================================================================

/// RSA private key used to sign app JWTs.
///
/// Holds PEM text that has already been parsed once, so signing cannot fail on
/// a malformed key later. Both PKCS#1 (`BEGIN RSA PRIVATE KEY`, the format
/// GitHub hands out) and PKCS#8 (`BEGIN PRIVATE KEY`) are accepted.
///
/// The key material is zeroed on drop and never shown in Debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    pem: Vec<u8>,
}

impl PrivateKey {
    /// Create a private key from PEM-encoded text.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` if the text is empty, lacks
    /// PEM markers, or does not decode to an RSA private key.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use hook_router_core::auth::PrivateKey;
    /// let pem = std::fs::read_to_string("app.private-key.pem").unwrap();
    /// let key = PrivateKey::from_pem(&pem).expect("Invalid PEM");
    /// ```
    pub fn from_pem(pem: &str) -> Result<Self, ValidationError> {
        let pem = pem.trim();

        if pem.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "private_key".to_string(),
                message: "PEM string cannot be empty".to_string(),
            });
        }

        if !pem.contains("-----BEGIN") || !pem.contains("-----END") {
            return Err(ValidationError::InvalidFormat {
                field: "private_key".to_string(),
                message: "Invalid PEM format: missing BEGIN/END markers".to_string(),
            });
        }

        if let Err(pkcs1_error) = RsaPrivateKey::from_pkcs1_pem(pem) {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|pkcs8_error| {
                ValidationError::InvalidFormat {
                    field: "private_key".to_string(),
                    message: format!(
                        "Failed to parse RSA private key (PKCS#1: {}; PKCS#8: {})",
                        pkcs1_error, pkcs8_error
                    ),
                }
            })?;
        }

        Ok(Self {
            pem: pem.as_bytes().to_vec(),
        })
    }

    /// Create a private key from PEM bytes, e.g. the raw contents of the
    /// downloaded key file.
    pub fn from_pem_bytes(pem: &[u8]) -> Result<Self, ValidationError> {
        let text = std::str::from_utf8(pem).map_err(|_| ValidationError::InvalidFormat {
            field: "private_key".to_string(),
            message: "PEM data is not valid UTF-8".to_string(),
        })?;
        Self::from_pem(text)
    }

    /// Get the PEM bytes.
    pub fn key_data(&self) -> &[u8] {
        &self.pem
    }
}

// Security: Don't expose key data in debug output
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_data", &"<REDACTED>")
            .finish()
    }
}

// ============================================================================
// Token Types
// ============================================================================

/// JWT claims for GitHub App authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer (GitHub App ID)
    pub iss: GitHubAppId,
    /// Issued at (Unix timestamp, backdated for clock skew)
    pub iat: i64,
    /// Expiration (Unix timestamp, max 10 minutes from now)
    pub exp: i64,
}

/// Signed app JWT.
///
/// Authenticates as the app itself, which is only enough to manage
/// installations and mint installation tokens.
#[derive(Clone)]
pub struct JsonWebToken {
    token: String,
    app_id: GitHubAppId,
    expires_at: DateTime<Utc>,
}

impl JsonWebToken {
    pub fn new(token: String, app_id: GitHubAppId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            app_id,
            expires_at,
        }
    }

    /// Get the encoded token, sent as `Authorization: Bearer <token>`.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn app_id(&self) -> GitHubAppId {
        self.app_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the token is currently expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

// Security: Don't expose token in debug output
impl std::fmt::Debug for JsonWebToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonWebToken")
            .field("app_id", &self.app_id)
            .field("expires_at", &self.expires_at)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Installation-scoped access token.
///
/// Issued by GitHub in exchange for an app JWT; acts on behalf of one
/// installation until `expires_at` (normally one hour).
#[derive(Clone)]
pub struct InstallationToken {
    token: String,
    installation_id: InstallationId,
    expires_at: DateTime<Utc>,
}

impl InstallationToken {
    pub fn new(token: String, installation_id: InstallationId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            installation_id,
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the token is currently expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

// Security: Don't expose token in debug output
impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("installation_id", &self.installation_id)
            .field("expires_at", &self.expires_at)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
