//! Prometheus metrics for webhook processing.
//!
//! Metrics live in a registry owned by [`ServiceMetrics`] rather than the
//! process-global default, so several routers can coexist (e.g. in tests).

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Service metrics for observability
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    pub webhook_requests_total: IntCounter,
    pub webhook_signature_failures_total: IntCounter,
    pub webhook_handler_failures_total: IntCounter,
    pub webhook_handlers_invoked_total: IntCounter,
    pub webhook_duration_seconds: Histogram,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let webhook_requests_total = register_counter(
            &registry,
            "webhook_requests_total",
            "Total webhook requests received",
        )?;
        let webhook_signature_failures_total = register_counter(
            &registry,
            "webhook_signature_failures_total",
            "Webhook requests rejected for a missing, malformed or wrong signature",
        )?;
        let webhook_handler_failures_total = register_counter(
            &registry,
            "webhook_handler_failures_total",
            "Webhook deliveries where a handler failed",
        )?;
        let webhook_handlers_invoked_total = register_counter(
            &registry,
            "webhook_handlers_invoked_total",
            "Handler invocations that completed successfully",
        )?;

        let webhook_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "webhook_duration_seconds",
                "Webhook processing time distribution",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        )?;
        registry.register(Box::new(webhook_duration_seconds.clone()))?;

        Ok(Arc::new(Self {
            registry,
            webhook_requests_total,
            webhook_signature_failures_total,
            webhook_handler_failures_total,
            webhook_handlers_invoked_total,
            webhook_duration_seconds,
        }))
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

fn register_counter(
    registry: &Registry,
    name: &str,
    help: &str,
) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}
