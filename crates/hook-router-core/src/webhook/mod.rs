//! GitHub webhook verification and routing.
//!
//! A delivery flows through three parts:
//!
//! - [`SignatureValidator`] checks `X-Hub-Signature` (HMAC-SHA1 of the raw
//!   body under the app's webhook secret)
//! - [`RouteTable`] maps event keys (`issues`, `issues.opened`) to handlers
//! - [`Dispatcher`] runs bare-event handlers, then event-action handlers
//!
//! [`WebhookReceiver`] ties them together and produces the HTTP response.
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use hook_router_core::webhook::{
//!     handler_fn, sign_payload, RouteTable, WebhookReceiver, WebhookRequest, WebhookSecret,
//! };
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let routes = Arc::new(RouteTable::new());
//! routes
//!     .register("issues.opened", handler_fn(|request| {
//!         println!("issue opened: {}", request.payload()["issue"]["title"]);
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! let receiver = WebhookReceiver::new(WebhookSecret::from("topsecret"), routes);
//!
//! let body = br#"{"action":"opened","issue":{"title":"Found a bug"}}"#;
//! let headers = HashMap::from([
//!     ("X-GitHub-Event".to_string(), "issues".to_string()),
//!     ("X-Hub-Signature".to_string(), sign_payload(b"topsecret", body).unwrap()),
//! ]);
//! let request = WebhookRequest::new(headers, Bytes::from_static(body)).unwrap();
//!
//! let response = receiver.receive_webhook(&request).await;
//! assert_eq!(response.status_code(), 200);
//! # }
//! ```

pub mod dispatcher;
pub mod handler;
pub mod receiver;
pub mod request;
pub mod routing;
pub mod validation;

pub use dispatcher::Dispatcher;
pub use handler::{handler_fn, FnHandler, WebhookHandler};
pub use receiver::{ReceiveState, WebhookReceiver, WebhookResponse};
pub use request::{WebhookRequest, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_HEADER};
pub use routing::{EventKey, RouteTable, KEY_SEPARATOR};
pub use validation::{
    compute_hex_digest, sign_payload, verify_signature, SignatureValidator, WebhookSecret,
};
