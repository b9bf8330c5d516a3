//! Webhook handler trait.
//!
//! Applications implement [`WebhookHandler`] and register implementations
//! against event keys in a [`RouteTable`](super::RouteTable).
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use hook_router_core::error::HandlerError;
//! use hook_router_core::webhook::{WebhookHandler, WebhookRequest};
//!
//! struct IssueOpenedHandler;
//!
//! #[async_trait]
//! impl WebhookHandler for IssueOpenedHandler {
//!     async fn handle_event(&self, request: &WebhookRequest) -> Result<(), HandlerError> {
//!         let title = request.payload()["issue"]["title"].as_str().unwrap_or_default();
//!         println!("New issue: {title}");
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use super::WebhookRequest;
use crate::error::HandlerError;

/// Handler for verified webhook deliveries.
///
/// Handlers run one at a time, in registration order, while the delivery's
/// HTTP request is still open. A returned error stops dispatch for that
/// delivery and is answered with a 500.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handle a verified delivery.
    async fn handle_event(&self, request: &WebhookRequest) -> Result<(), HandlerError>;
}

/// Adapter turning a synchronous closure into a [`WebhookHandler`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> WebhookHandler for FnHandler<F>
where
    F: Fn(&WebhookRequest) -> Result<(), HandlerError> + Send + Sync,
{
    async fn handle_event(&self, request: &WebhookRequest) -> Result<(), HandlerError> {
        (self.f)(request)
    }
}

/// Wrap a closure as a shareable handler.
///
/// ```rust
/// use hook_router_core::webhook::{handler_fn, RouteTable};
///
/// let routes = RouteTable::new();
/// routes
///     .register("ping", handler_fn(|_request| Ok(())))
///     .unwrap();
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn WebhookHandler>
where
    F: Fn(&WebhookRequest) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}
