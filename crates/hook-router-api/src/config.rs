//! Configuration types for the HTTP service
//!
//! Sources, applied in order (later sources override earlier ones):
//!
//! 1. `./config/service.yaml` (optional)
//! 2. The file named by `HOOK_ROUTER_CONFIG_FILE` (required when set)
//! 3. Environment variables prefixed `HOOK_ROUTER__` with `__` as the
//!    nesting separator, e.g. `HOOK_ROUTER__SERVER__PORT=9090`
//! 4. `GITHUBAPP_ID`, `GITHUBAPP_KEY`, `GITHUBAPP_SECRET`, `GITHUBAPP_URL`
//!    and `GITHUBAPP_ROUTE`, which override the `github_app` section

use hook_router_core::{GitHubAppConfig, GitHubAppSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

/// Names the operator-supplied configuration file.
pub const CONFIG_FILE_ENV: &str = "HOOK_ROUTER_CONFIG_FILE";

/// Prefix for nested service settings in the environment.
pub const ENV_PREFIX: &str = "HOOK_ROUTER";

const GITHUB_APP_ENV_PREFIX: &str = "GITHUBAPP";

/// Paths served by the router itself; the webhook route may not shadow them.
pub const RESERVED_ROUTES: &[&str] = &["/health", "/metrics"];

/// Service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// GitHub App identity and webhook secret
    pub github_app: GitHubAppConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds, handlers included
    pub timeout_seconds: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
            shutdown_timeout_seconds: 30,
            max_body_size: 25 * 1024 * 1024, // GitHub caps payloads at 25MB
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the default sources.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit_path = std::env::var(CONFIG_FILE_ENV)
            .ok()
            .filter(|path| !path.is_empty());
        Self::load_from(explicit_path.as_deref().map(Path::new))
    }

    /// Load configuration, reading `explicit_path` instead of consulting
    /// `HOOK_ROUTER_CONFIG_FILE`.
    ///
    /// The file format follows the file extension.
    pub fn load_from(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder().add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

        if let Some(path) = explicit_path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let mut service_config: ServiceConfig = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        let app_overrides: GitHubAppConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix(GITHUB_APP_ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        service_config.github_app = service_config.github_app.merge(app_overrides);

        Ok(service_config)
    }

    /// Check server and logging settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(invalid("server.host cannot be empty"));
        }
        if self.server.timeout_seconds == 0 {
            return Err(invalid("server.timeout_seconds must be greater than 0"));
        }
        if self.server.max_body_size == 0 {
            return Err(invalid("server.max_body_size must be greater than 0"));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(&format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Validate the `github_app` section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::GitHubApp` for missing or unusable app settings,
    /// and `ConfigError::Invalid` if the webhook route collides with a
    /// reserved path.
    pub fn github_app_settings(&self) -> Result<GitHubAppSettings, ConfigError> {
        let settings = self.github_app.validate()?;
        if RESERVED_ROUTES.contains(&settings.route.as_str()) {
            return Err(invalid(&format!(
                "GITHUBAPP_ROUTE '{}' is reserved",
                settings.route
            )));
        }
        Ok(settings)
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid {
        message: message.to_string(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
