//! # Hook Router HTTP Service
//!
//! HTTP server that receives GitHub App webhooks and hands them to a
//! [`WebhookReceiver`] for verification and dispatch.
//!
//! This service provides:
//! - The webhook endpoint, mounted at the configured route
//! - A health check endpoint
//! - A Prometheus metrics endpoint

pub mod config;
pub mod errors;
pub mod metrics;

pub use config::{LoggingConfig, ServerConfig, ServiceConfig};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};
pub use metrics::ServiceMetrics;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use hook_router_core::{WebhookError, WebhookReceiver, WebhookRequest};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, future::IntoFuture, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, instrument};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Path the webhook endpoint is mounted at
    pub webhook_route: String,

    /// Verifies and dispatches deliveries
    pub receiver: Arc<WebhookReceiver>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(
        server: ServerConfig,
        webhook_route: String,
        receiver: Arc<WebhookReceiver>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            server,
            webhook_route,
            receiver,
            metrics,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.server.timeout_seconds);
    let max_body_size = state.server.max_body_size;

    Router::new()
        .route(&state.webhook_route, post(handle_webhook))
        .route("/health", get(handle_health_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout))
                .layer(DefaultBodyLimit::max(max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Serves until SIGINT or SIGTERM, then lets in-flight deliveries finish.
pub async fn start_server(
    server: ServerConfig,
    webhook_route: String,
    receiver: Arc<WebhookReceiver>,
) -> Result<(), ServiceError> {
    let metrics = ServiceMetrics::new().map_err(|e| {
        ServiceError::Configuration(ConfigError::Invalid {
            message: format!("Failed to initialize metrics: {}", e),
        })
    })?;

    let addr = format!("{}:{}", server.host, server.port);
    let shutdown_timeout = Duration::from_secs(server.shutdown_timeout_seconds);

    let state = AppState::new(server, webhook_route.clone(), receiver, metrics);
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.clone(),
                message: e.to_string(),
            })?;

    info!(address = %addr, webhook_route = %webhook_route, "Starting HTTP server");

    let (shutdown_started_tx, shutdown_started_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown_signal = async move {
        wait_for_shutdown_signal().await;
        info!(
            timeout_seconds = shutdown_timeout.as_secs(),
            "Initiating graceful shutdown"
        );
        let _ = shutdown_started_tx.send(());
    };

    // Stop accepting connections on signal, then give in-flight deliveries
    // up to the shutdown timeout to complete.
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .into_future();
    let drain_deadline = async {
        if shutdown_started_rx.await.is_ok() {
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
        }
        _ = drain_deadline => {
            error!("Graceful shutdown timed out; abandoning in-flight requests");
        }
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C)"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

// ============================================================================
// Webhook Handlers
// ============================================================================

/// Handle GitHub webhook requests
///
/// Verifies the signature, runs every matching handler, and answers once
/// they have all finished:
/// - `200 OK` with body `OK` on success
/// - `400 Bad Request` for a non-JSON body, a missing event header, or a bad
///   signature
/// - `500 Internal Server Error` if a handler failed
#[instrument(skip(state, headers, body))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, WebhookHandlerError> {
    state.metrics.webhook_requests_total.inc();
    let timer = state.metrics.webhook_duration_seconds.start_timer();

    let header_map: HashMap<String, String> = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_lowercase(),
                v.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();

    let request = WebhookRequest::new(header_map, body)?;
    let result = state.receiver.process_webhook(&request).await;
    timer.observe_duration();

    match result {
        Ok(invoked) => {
            state
                .metrics
                .webhook_handlers_invoked_total
                .inc_by(invoked as u64);
            Ok("OK")
        }
        Err(e) => {
            match &e {
                WebhookError::InvalidSignature { .. } => {
                    state.metrics.webhook_signature_failures_total.inc()
                }
                WebhookError::Dispatch(_) => state.metrics.webhook_handler_failures_total.inc(),
                WebhookError::InvalidRequest(_) => {}
            }
            Err(e.into())
        }
    }
}

// ============================================================================
// Health and Observability
// ============================================================================

/// Basic health check endpoint
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prometheus metrics endpoint
#[instrument(skip_all)]
async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .encode()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Health check response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
