//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hook_router_core::{ValidationError, WebhookError, WebhookResponse};

/// Webhook handler errors with HTTP status code mapping
///
/// - `400 Bad Request`: the body is not a JSON object, `X-GitHub-Event` is
///   missing, or the signature is missing, malformed or wrong
/// - `500 Internal Server Error`: a registered handler failed
///
/// Status and message come from [`WebhookResponse`], so clients never see
/// signature values or handler error details. The receiver and dispatcher
/// log those server-side.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// The request could not be turned into a webhook request.
    ///
    /// Maps to: `400 Bad Request`
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Verification or dispatch failed.
    ///
    /// Maps to the status given by [`WebhookError::status_code`].
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

impl From<WebhookHandlerError> for WebhookResponse {
    fn from(error: WebhookHandlerError) -> Self {
        let error = match error {
            WebhookHandlerError::InvalidRequest(e) => WebhookError::InvalidRequest(e),
            WebhookHandlerError::Webhook(e) => e,
        };
        WebhookResponse::from(Err::<usize, _>(error))
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let response = WebhookResponse::from(self);
        let status = StatusCode::from_u16(response.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "error": response.message(),
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration loading failed: {0}")]
    Loading(#[from] config::ConfigError),

    #[error("GitHub App configuration: {0}")]
    GitHubApp(#[from] hook_router_core::ConfigError),
}
