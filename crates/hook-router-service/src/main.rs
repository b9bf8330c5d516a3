//! # Hook Router Service
//!
//! Binary entry point for the GitHub App webhook receiver.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes logging
//! - Builds the GitHub App identity and registers webhook handlers
//! - Starts the HTTP server from hook-router-api

mod handlers;

use hook_router_api::{start_server, LoggingConfig, ServiceConfig, ServiceError};
use hook_router_core::{GitHubApp, RouteTable, WebhookReceiver};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources, later overriding earlier:
    //  1. ./config/service.yaml
    //  2. Path given by HOOK_ROUTER_CONFIG_FILE
    //  3. HOOK_ROUTER__* variables, e.g. HOOK_ROUTER__SERVER__PORT=9090
    //  4. GITHUBAPP_ID, GITHUBAPP_KEY, GITHUBAPP_SECRET, GITHUBAPP_URL,
    //     GITHUBAPP_ROUTE
    // -------------------------------------------------------------------------
    let service_config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingConfig::default());
            error!(error = %e, "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    init_logging(&service_config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting hook-router service");

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    let settings = match service_config.github_app_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "GitHub App configuration is invalid; aborting");
            std::process::exit(3);
        }
    };

    let app = match GitHubApp::from_settings(&settings) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!(error = %e, "Failed to initialize GitHub App credentials; aborting");
            std::process::exit(3);
        }
    };
    info!(app_id = %app.app_id(), api_url = %app.api_url(), "GitHub App initialized");

    let routes = Arc::new(RouteTable::new());
    handlers::register_handlers(&routes, app)?;
    info!(event_keys = ?routes.keys(), "Registered webhook handlers");

    let receiver = Arc::new(WebhookReceiver::new(settings.webhook_secret.clone(), routes));

    if let Err(e) = start_server(service_config.server, settings.route.clone(), receiver).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "hook_router_service={0},hook_router_api={0},hook_router_core={0},tower_http=info",
            logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
