//! Error types for webhook verification, routing, configuration and app
//! authentication.
//!
//! Per-request failures ([`WebhookError`], [`DispatchError`],
//! [`PayloadAccessError`]) are contained to the request that produced them.
//! [`ConfigError`] is fatal and is raised before the server starts serving.

use thiserror::Error;

use crate::auth::InstallationId;

/// Error type returned by application-provided webhook handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Input validation errors.
///
/// These errors occur when validating request data, event keys, signature
/// headers or configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing.
    #[error("Required field missing: {field}")]
    Required { field: String },

    /// A field has an invalid format.
    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },
}

/// Configuration errors raised during startup.
///
/// Any of these must prevent the service from serving traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Payload accessed outside the context it is valid in.
///
/// Signals a programming error in handler code rather than bad input from
/// GitHub.
#[derive(Debug, Error)]
pub enum PayloadAccessError {
    /// The payload does not describe an app installation.
    #[error("Payload is only available in the context of a GitHub App installation hook request")]
    NoInstallation,

    /// The installation block exists but its `id` is not a positive integer.
    #[error("Installation id in payload is invalid: {value}")]
    InvalidInstallationId { value: String },
}

/// Failure while invoking the handlers matched for an event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler returned an error. Handlers after it were not invoked.
    #[error("Handler #{position} registered for '{key}' failed: {source}")]
    HandlerFailed {
        key: String,
        position: usize,
        #[source]
        source: HandlerError,
    },
}

/// Per-request webhook processing failures.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request is missing required data (for example `X-GitHub-Event`).
    #[error("Invalid webhook request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The signature header is missing, malformed or does not match.
    #[error("Signature verification failed: {reason}")]
    InvalidSignature { reason: String },

    /// A handler failed during dispatch.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl WebhookError {
    /// HTTP status code the hosting layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::InvalidSignature { .. } => 400,
            Self::Dispatch(_) => 500,
        }
    }
}

/// GitHub App authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid private key format or data (non-retryable).
    #[error("Invalid private key: {message}")]
    InvalidPrivateKey { message: String },

    /// JWT generation failed (non-retryable).
    #[error("JWT generation failed: {message}")]
    JwtGenerationFailed { message: String },

    /// Installation not found or access denied (non-retryable).
    #[error("Installation {installation_id} not found or access denied")]
    InstallationNotFound { installation_id: InstallationId },

    /// GitHub API client error.
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
}

/// Errors during GitHub API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP error response from GitHub API.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// The request path could not be joined onto the API base URL.
    #[error("Invalid API URL: {message}")]
    InvalidUrl { message: String },

    /// Failed to parse JSON response from GitHub API.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
