//! Common test utilities for hook-router integration tests
//!
//! This module provides:
//! - A recording handler that captures invocation order
//! - Builders for app state, routers and signed requests

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    Router,
};
use hook_router_api::{create_router, AppState, ServerConfig, ServiceMetrics};
use hook_router_core::{
    webhook::sign_payload, HandlerError, RouteTable, WebhookHandler, WebhookReceiver,
    WebhookRequest, WebhookSecret,
};
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
pub const TEST_SECRET: &str = "topsecret";

#[allow(dead_code)]
pub const TEST_DELIVERY_ID: &str = "72d3162e-cc78-11e3-81ab-4c9367dc0958";

// ============================================================================
// Recording Handler
// ============================================================================

/// Shared log of handler invocations, in the order they happened.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct InvocationLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl InvocationLog {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// A handler that appends `label` to this log.
    #[allow(dead_code)]
    pub fn handler(&self, label: &str) -> Arc<dyn WebhookHandler> {
        Arc::new(RecordingHandler {
            label: label.to_string(),
            log: self.clone(),
            fail: false,
        })
    }

    /// A handler that appends `label` to this log and then fails.
    #[allow(dead_code)]
    pub fn failing_handler(&self, label: &str) -> Arc<dyn WebhookHandler> {
        Arc::new(RecordingHandler {
            label: label.to_string(),
            log: self.clone(),
            fail: true,
        })
    }
}

struct RecordingHandler {
    label: String,
    log: InvocationLog,
    fail: bool,
}

#[async_trait::async_trait]
impl WebhookHandler for RecordingHandler {
    async fn handle_event(&self, _request: &WebhookRequest) -> Result<(), HandlerError> {
        self.log.entries.lock().unwrap().push(self.label.clone());
        if self.fail {
            return Err(format!("{} failed", self.label).into());
        }
        Ok(())
    }
}

// ============================================================================
// App Builders
// ============================================================================

/// App state with a webhook route of `/` and the given route table.
#[allow(dead_code)]
pub fn create_test_app_state(routes: Arc<RouteTable>) -> AppState {
    create_test_app_state_with_route(routes, "/")
}

#[allow(dead_code)]
pub fn create_test_app_state_with_route(routes: Arc<RouteTable>, webhook_route: &str) -> AppState {
    let receiver = Arc::new(WebhookReceiver::new(WebhookSecret::from(TEST_SECRET), routes));
    AppState::new(
        ServerConfig::default(),
        webhook_route.to_string(),
        receiver,
        ServiceMetrics::new().unwrap(),
    )
}

#[allow(dead_code)]
pub fn create_test_router(routes: Arc<RouteTable>) -> Router {
    create_router(create_test_app_state(routes))
}

// ============================================================================
// Request Builders
// ============================================================================

/// `sha1=<hex>` signature of `body` under the test secret.
#[allow(dead_code)]
pub fn sign(body: &str) -> String {
    sign_payload(TEST_SECRET.as_bytes(), body.as_bytes()).unwrap()
}

/// Headers for a correctly signed delivery of `event`.
#[allow(dead_code)]
pub fn create_signed_headers(event: &str, body: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("x-github-delivery", HeaderValue::from_static(TEST_DELIVERY_ID));
    headers.insert("x-github-event", HeaderValue::from_str(event).unwrap());
    headers.insert("x-hub-signature", HeaderValue::from_str(&sign(body)).unwrap());
    headers
}

/// POST request carrying `body` to `uri` with the given headers.
#[allow(dead_code)]
pub fn create_webhook_request(uri: &str, headers: &HeaderMap, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
