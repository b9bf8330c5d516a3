//! GitHub App configuration.
//!
//! [`GitHubAppConfig`] is the raw, deserializable form; every field is
//! optional so partial sources can be layered. [`GitHubAppConfig::validate`]
//! turns it into [`GitHubAppSettings`] or fails with the name of the first
//! missing or unusable setting.

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::auth::{GitHubAppId, PrivateKey};
use crate::error::ConfigError;
use crate::webhook::WebhookSecret;

/// Environment variable names for each setting.
pub const ENV_APP_ID: &str = "GITHUBAPP_ID";
pub const ENV_APP_KEY: &str = "GITHUBAPP_KEY";
pub const ENV_APP_SECRET: &str = "GITHUBAPP_SECRET";
pub const ENV_APP_URL: &str = "GITHUBAPP_URL";
pub const ENV_APP_ROUTE: &str = "GITHUBAPP_ROUTE";

/// Webhook route used when none is configured.
pub const DEFAULT_ROUTE: &str = "/";

/// Raw GitHub App settings as read from files or the environment.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubAppConfig {
    /// App ID (`GITHUBAPP_ID`); numeric or a decimal string
    #[serde(deserialize_with = "deserialize_app_id")]
    pub id: Option<u64>,
    /// PEM private key text (`GITHUBAPP_KEY`)
    pub key: Option<String>,
    /// Webhook secret (`GITHUBAPP_SECRET`)
    pub secret: Option<String>,
    /// GitHub Enterprise API URL (`GITHUBAPP_URL`)
    pub url: Option<String>,
    /// Path the webhook endpoint is mounted at (`GITHUBAPP_ROUTE`)
    pub route: Option<String>,
}

impl GitHubAppConfig {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: GitHubAppConfig) -> GitHubAppConfig {
        GitHubAppConfig {
            id: overrides.id.or(self.id),
            key: overrides.key.or(self.key),
            secret: overrides.secret.or(self.secret),
            url: overrides.url.or(self.url),
            route: overrides.route.or(self.route),
        }
    }

    /// Check required settings and parse them into typed values.
    ///
    /// Required settings are checked in the order ID, key, secret.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Missing` when ID, key or secret is absent or empty
    ///   (an ID of zero counts as absent)
    /// - `ConfigError::Invalid` when the key is not an RSA private key, the
    ///   URL does not parse, or the route does not start with `/`
    pub fn validate(&self) -> Result<GitHubAppSettings, ConfigError> {
        let app_id = match self.id {
            Some(id) if id > 0 => GitHubAppId::new(id),
            _ => return Err(missing(ENV_APP_ID)),
        };

        let key = non_empty(self.key.as_deref()).ok_or_else(|| missing(ENV_APP_KEY))?;
        let private_key =
            PrivateKey::from_pem(&unescape_newlines(key)).map_err(|e| ConfigError::Invalid {
                message: format!("{}: {}", ENV_APP_KEY, e),
            })?;

        let secret = match self.secret.as_deref() {
            Some(secret) if !secret.is_empty() => WebhookSecret::from(secret),
            _ => return Err(missing(ENV_APP_SECRET)),
        };

        let api_url = non_empty(self.url.as_deref())
            .map(|url| {
                Url::parse(url).map_err(|e| ConfigError::Invalid {
                    message: format!("{}: '{}' is not a valid URL: {}", ENV_APP_URL, url, e),
                })
            })
            .transpose()?;

        let route = non_empty(self.route.as_deref())
            .unwrap_or(DEFAULT_ROUTE)
            .to_string();
        if !route.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!("{}: '{}' must start with '/'", ENV_APP_ROUTE, route),
            });
        }

        Ok(GitHubAppSettings {
            app_id,
            private_key,
            webhook_secret: secret,
            api_url,
            route,
        })
    }
}

// Security: Don't expose key or secret in debug output
impl std::fmt::Debug for GitHubAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAppConfig")
            .field("id", &self.id)
            .field("key", &self.key.as_ref().map(|_| "<REDACTED>"))
            .field("secret", &self.secret.as_ref().map(|_| "<REDACTED>"))
            .field("url", &self.url)
            .field("route", &self.route)
            .finish()
    }
}

/// Validated GitHub App settings.
#[derive(Debug, Clone)]
pub struct GitHubAppSettings {
    pub app_id: GitHubAppId,
    pub private_key: PrivateKey,
    pub webhook_secret: WebhookSecret,
    /// Enterprise API URL; `None` means the public GitHub API.
    pub api_url: Option<Url>,
    pub route: String,
}

// Environment sources deliver every value as a string, possibly empty.
fn deserialize_app_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid app id '{}'", text))),
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::Missing {
        key: key.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// Single-line environment variables often carry the PEM with literal "\n".
fn unescape_newlines(pem: &str) -> String {
    if pem.contains('\n') {
        pem.to_string()
    } else {
        pem.replace("\\n", "\n")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
