//! Event dispatch.
//!
//! For an event type `E` with action `A`, handlers registered under `E` run
//! first, then handlers registered under `E.A`. Handlers run sequentially in
//! registration order and dispatch stops at the first failure.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use super::routing::KEY_SEPARATOR;
use super::{RouteTable, WebhookRequest};
use crate::error::DispatchError;

/// Invokes the handlers matching a delivery.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
}

impl Dispatcher {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Keys consulted for an event, in invocation order.
    ///
    /// ```rust
    /// use hook_router_core::webhook::Dispatcher;
    ///
    /// assert_eq!(Dispatcher::resolve_keys("issues", Some("opened")), vec!["issues", "issues.opened"]);
    /// assert_eq!(Dispatcher::resolve_keys("ping", None), vec!["ping"]);
    /// assert_eq!(Dispatcher::resolve_keys("ping", Some("")), vec!["ping"]);
    /// ```
    pub fn resolve_keys(event: &str, action: Option<&str>) -> Vec<String> {
        let mut keys = vec![event.to_string()];
        if let Some(action) = action.filter(|a| !a.is_empty()) {
            keys.push(format!("{}{}{}", event, KEY_SEPARATOR, action));
        }
        keys
    }

    /// Invoke every handler matching `event`/`action` with `request`.
    ///
    /// Returns the number of handlers invoked; zero when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::HandlerFailed` for the first handler that
    /// fails. Later handlers are not invoked.
    #[instrument(skip(self, request), fields(delivery_id = request.delivery_id()))]
    pub async fn dispatch(
        &self,
        event: &str,
        action: Option<&str>,
        request: &WebhookRequest,
    ) -> Result<usize, DispatchError> {
        let mut invoked = 0;

        for key in Self::resolve_keys(event, action) {
            let handlers = self.routes.lookup(&key);
            debug!(event_key = %key, handler_count = handlers.len(), "Resolved handlers");

            for (position, handler) in handlers.iter().enumerate() {
                if let Err(source) = handler.handle_event(request).await {
                    error!(
                        event_key = %key,
                        position = position,
                        error = %source,
                        "Webhook handler failed"
                    );
                    return Err(DispatchError::HandlerFailed {
                        key,
                        position,
                        source,
                    });
                }
                invoked += 1;
            }
        }

        Ok(invoked)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
