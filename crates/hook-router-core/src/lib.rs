//! # Hook Router Core
//!
//! Receives GitHub App webhook deliveries, verifies their HMAC-SHA1
//! signature, and routes each verified delivery to the handlers registered
//! for its event type and action.
//!
//! - [`webhook`]: signature validation, route table, dispatch, receiver
//! - [`auth`]: app identity, JWTs and installation clients for handlers
//! - [`config`]: GitHub App settings and their validation
//! - [`error`]: error types

pub mod auth;
pub mod config;
pub mod error;
pub mod webhook;

pub use auth::{GitHubApp, GitHubAppId, GitHubClient, InstallationId, PrivateKey};
pub use config::{GitHubAppConfig, GitHubAppSettings};
pub use error::{
    AuthError, ConfigError, DispatchError, HandlerError, PayloadAccessError, ValidationError,
    WebhookError,
};
pub use webhook::{
    handler_fn, Dispatcher, RouteTable, WebhookHandler, WebhookReceiver, WebhookRequest,
    WebhookResponse, WebhookSecret,
};
