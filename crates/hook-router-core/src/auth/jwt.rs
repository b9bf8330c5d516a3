//! JWT generation for GitHub App authentication.
//!
//! GitHub requires the app JWT to be signed with RS256, to expire at most ten
//! minutes after issue, and to name the app ID as issuer.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use super::{GitHubAppId, JsonWebToken, JwtClaims, PrivateKey};
use crate::error::AuthError;

/// Longest lifetime GitHub accepts for an app JWT.
pub const MAX_JWT_LIFETIME_MINUTES: i64 = 10;

/// `iat` is backdated by this much to tolerate clock drift with GitHub.
const CLOCK_SKEW_SECONDS: i64 = 60;

/// Interface for producing app JWTs.
pub trait JwtGenerator: Send + Sync {
    /// Generate a JWT for the given app.
    fn generate_jwt(&self, app_id: GitHubAppId) -> Result<JsonWebToken, AuthError>;

    /// Lifetime of the tokens this generator produces.
    fn expiration_duration(&self) -> Duration;
}

/// RS256 JWT generator.
///
/// The encoding key is built once on construction.
///
/// # Examples
///
/// ```no_run
/// # use hook_router_core::auth::{GitHubAppId, JwtGenerator, PrivateKey, RS256JwtGenerator};
/// # let key_pem = std::fs::read_to_string("app.pem").unwrap();
/// let private_key = PrivateKey::from_pem(&key_pem).unwrap();
/// let generator = RS256JwtGenerator::new(&private_key).unwrap();
/// let jwt = generator.generate_jwt(GitHubAppId::new(12345)).unwrap();
/// ```
pub struct RS256JwtGenerator {
    encoding_key: EncodingKey,
    expiration_duration: Duration,
}

impl RS256JwtGenerator {
    /// Create a generator producing tokens with the maximum ten minute lifetime.
    pub fn new(private_key: &PrivateKey) -> Result<Self, AuthError> {
        Self::with_expiration(private_key, Duration::minutes(MAX_JWT_LIFETIME_MINUTES))
    }

    /// Create a generator with a custom token lifetime.
    ///
    /// Lifetimes above ten minutes are capped at ten minutes.
    pub fn with_expiration(
        private_key: &PrivateKey,
        expiration_duration: Duration,
    ) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key.key_data()).map_err(|e| {
            AuthError::InvalidPrivateKey {
                message: format!("Failed to create encoding key: {}", e),
            }
        })?;

        Ok(Self {
            encoding_key,
            expiration_duration: expiration_duration
                .min(Duration::minutes(MAX_JWT_LIFETIME_MINUTES)),
        })
    }

    fn build_claims(&self, app_id: GitHubAppId) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            iss: app_id,
            iat: (now - Duration::seconds(CLOCK_SKEW_SECONDS)).timestamp(),
            exp: (now + self.expiration_duration).timestamp(),
        }
    }
}

impl JwtGenerator for RS256JwtGenerator {
    fn generate_jwt(&self, app_id: GitHubAppId) -> Result<JsonWebToken, AuthError> {
        let claims = self.build_claims(app_id);
        let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0).ok_or_else(|| {
            AuthError::JwtGenerationFailed {
                message: "expiration timestamp out of range".to_string(),
            }
        })?;

        let header = Header::new(Algorithm::RS256);
        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            AuthError::JwtGenerationFailed {
                message: format!("Failed to encode JWT: {}", e),
            }
        })?;

        Ok(JsonWebToken::new(token, app_id, expires_at))
    }

    fn expiration_duration(&self) -> Duration {
        self.expiration_duration
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
