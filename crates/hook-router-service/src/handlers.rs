//! Webhook handlers shipped with the service.

use anyhow::Context;
use async_trait::async_trait;
use hook_router_core::{
    GitHubApp, HandlerError, PayloadAccessError, RouteTable, ValidationError, WebhookHandler,
    WebhookRequest,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Register the service's handlers.
pub fn register_handlers(routes: &RouteTable, app: Arc<GitHubApp>) -> Result<(), ValidationError> {
    routes.register("ping", Arc::new(PingHandler))?;

    let installation_handler: Arc<dyn WebhookHandler> = Arc::new(InstallationHandler::new(app));
    routes.register("installation.created", installation_handler.clone())?;
    routes.register("installation_repositories", installation_handler)?;
    Ok(())
}

/// Logs the `ping` GitHub sends when a webhook is first configured.
pub struct PingHandler;

#[async_trait]
impl WebhookHandler for PingHandler {
    async fn handle_event(&self, request: &WebhookRequest) -> Result<(), HandlerError> {
        let payload = request.payload();
        info!(
            hook_id = payload["hook_id"].as_u64(),
            zen = payload["zen"].as_str().unwrap_or_default(),
            "Received ping"
        );
        Ok(())
    }
}

/// Authenticates as a new or changed installation and reports how many
/// repositories it can reach.
pub struct InstallationHandler {
    app: Arc<GitHubApp>,
}

#[derive(Debug, Deserialize)]
struct RepositoryList {
    total_count: u64,
}

impl InstallationHandler {
    pub fn new(app: Arc<GitHubApp>) -> Self {
        Self { app }
    }
}

#[async_trait]
impl WebhookHandler for InstallationHandler {
    async fn handle_event(&self, request: &WebhookRequest) -> Result<(), HandlerError> {
        let payload = request.installation_payload()?;
        let installation_id = request
            .installation_id()
            .ok_or(PayloadAccessError::NoInstallation)?;
        let account = payload["installation"]["account"]["login"]
            .as_str()
            .unwrap_or("<unknown>");

        let client = self
            .app
            .installation_client(installation_id)
            .await
            .with_context(|| format!("authenticating as installation {}", installation_id))?;
        let repositories: RepositoryList = client
            .get("installation/repositories")
            .await
            .context("listing installation repositories")?
            .json()
            .await
            .context("parsing installation repositories")?;

        info!(
            installation_id = %installation_id,
            account = account,
            action = request.action(),
            repository_count = repositories.total_count,
            "Installation is active"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
