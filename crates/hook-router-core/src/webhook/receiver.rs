//! Webhook receiver.
//!
//! Ties signature validation and dispatch together for one delivery:
//!
//! 1. Read the event type from `X-GitHub-Event`
//! 2. Verify `X-Hub-Signature` against the raw body
//! 3. Dispatch to bare-event handlers, then event-action handlers
//! 4. Answer 200 once every handler has finished
//!
//! Handlers run inside the request, so GitHub's delivery timeout bounds how
//! long they may take.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::{Dispatcher, RouteTable, SignatureValidator, WebhookRequest, WebhookSecret};
use crate::error::{ValidationError, WebhookError};

/// Terminal state of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    /// All matching handlers completed.
    Completed,
    /// The delivery was refused before any handler ran.
    Rejected,
    /// A handler failed.
    Failed,
}

/// HTTP response for a webhook delivery.
#[derive(Debug, Clone)]
pub enum WebhookResponse {
    /// 200 OK - Every matching handler completed
    Ok { handlers_invoked: usize },

    /// 400 Bad Request - Missing `X-GitHub-Event` header
    BadRequest { message: String },

    /// 400 Bad Request - Missing, malformed or mismatched signature
    Rejected { message: String },

    /// 500 Internal Server Error - A handler failed
    InternalError { message: String },
}

impl WebhookResponse {
    /// Get the HTTP status code for this response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok { .. } => 200,
            Self::BadRequest { .. } => 400,
            Self::Rejected { .. } => 400,
            Self::InternalError { .. } => 500,
        }
    }

    /// Get the response body text.
    pub fn message(&self) -> &str {
        match self {
            Self::Ok { .. } => "OK",
            Self::BadRequest { message } => message,
            Self::Rejected { message } => message,
            Self::InternalError { message } => message,
        }
    }

    /// Check if response indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn state(&self) -> ReceiveState {
        match self {
            Self::Ok { .. } => ReceiveState::Completed,
            Self::BadRequest { .. } | Self::Rejected { .. } => ReceiveState::Rejected,
            Self::InternalError { .. } => ReceiveState::Failed,
        }
    }
}

impl From<Result<usize, WebhookError>> for WebhookResponse {
    fn from(result: Result<usize, WebhookError>) -> Self {
        match result {
            Ok(handlers_invoked) => Self::Ok { handlers_invoked },
            Err(WebhookError::InvalidRequest(e)) => Self::BadRequest {
                message: e.to_string(),
            },
            Err(WebhookError::InvalidSignature { .. }) => Self::Rejected {
                message: "Invalid signature".to_string(),
            },
            Err(WebhookError::Dispatch(_)) => Self::InternalError {
                message: "Webhook handler failed".to_string(),
            },
        }
    }
}

/// Webhook receiver for processing incoming GitHub webhooks.
///
/// # Examples
///
/// ```rust
/// use hook_router_core::webhook::{handler_fn, RouteTable, WebhookReceiver, WebhookSecret};
/// use std::sync::Arc;
///
/// let routes = Arc::new(RouteTable::new());
/// routes.register("issues.opened", handler_fn(|_request| Ok(()))).unwrap();
///
/// let receiver = WebhookReceiver::new(WebhookSecret::from("topsecret"), routes);
/// ```
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    validator: SignatureValidator,
    dispatcher: Dispatcher,
}

impl WebhookReceiver {
    pub fn new(secret: WebhookSecret, routes: Arc<RouteTable>) -> Self {
        Self {
            validator: SignatureValidator::new(secret),
            dispatcher: Dispatcher::new(routes),
        }
    }

    /// Route table handlers are looked up in; may be added to at any time.
    pub fn routes(&self) -> &Arc<RouteTable> {
        self.dispatcher.routes()
    }

    /// Verify and dispatch one delivery.
    ///
    /// Returns the number of handlers invoked.
    ///
    /// # Errors
    ///
    /// - `WebhookError::InvalidRequest` if `X-GitHub-Event` is missing
    /// - `WebhookError::InvalidSignature` if the signature is missing,
    ///   malformed or does not match; no handler runs
    /// - `WebhookError::Dispatch` if a handler fails
    #[instrument(
        skip(self, request),
        fields(event_type = request.event_type(), delivery_id = request.delivery_id())
    )]
    pub async fn process_webhook(&self, request: &WebhookRequest) -> Result<usize, WebhookError> {
        let event_type = request
            .event_type()
            .ok_or_else(|| ValidationError::Required {
                field: "X-GitHub-Event".to_string(),
            })?;

        let signature = match request.signature() {
            Some(signature) => signature,
            None => {
                warn!("GitHub hook signature verification failed: missing X-Hub-Signature header");
                return Err(WebhookError::InvalidSignature {
                    reason: "missing X-Hub-Signature header".to_string(),
                });
            }
        };

        match self.validator.validate(request.body(), signature) {
            Ok(true) => debug!("Webhook signature validated"),
            Ok(false) => {
                warn!("GitHub hook signature verification failed");
                return Err(WebhookError::InvalidSignature {
                    reason: "digest mismatch".to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, "GitHub hook signature verification failed");
                return Err(WebhookError::InvalidSignature {
                    reason: e.to_string(),
                });
            }
        }

        let action = request.action();
        let invoked = self.dispatcher.dispatch(event_type, action, request).await?;

        info!(
            action = action,
            handlers_invoked = invoked,
            "Webhook processed successfully"
        );
        Ok(invoked)
    }

    /// Verify and dispatch one delivery, producing the HTTP response.
    pub async fn receive_webhook(&self, request: &WebhookRequest) -> WebhookResponse {
        self.process_webhook(request).await.into()
    }
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
