//! GitHub App credentials and authenticated API clients.
//!
//! [`GitHubApp`] owns the app's identity (app ID, signing key, API base URL)
//! and hands out [`GitHubClient`]s in three flavours:
//!
//! - [`GitHubApp::client`]: unauthenticated
//! - [`GitHubApp::app_client`]: authenticated as the app with a fresh JWT
//! - [`GitHubApp::installation_client`]: authenticated as one installation,
//!   using a token exchanged for a JWT

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{
    GitHubAppId, InstallationId, InstallationToken, JsonWebToken, JwtGenerator, PrivateKey,
    RS256JwtGenerator,
};
use crate::config::GitHubAppSettings;
use crate::error::{ApiError, AuthError};

/// Public GitHub API root, used when no Enterprise URL is configured.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("hook-router/", env!("CARGO_PKG_VERSION"));

/// Credentials attached to every request a [`GitHubClient`] builds.
#[derive(Debug, Clone)]
pub enum ClientAuth {
    Anonymous,
    App(JsonWebToken),
    Installation(InstallationToken),
}

impl ClientAuth {
    fn bearer(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::App(jwt) => Some(jwt.token()),
            Self::Installation(token) => Some(token.token()),
        }
    }
}

/// HTTP client bound to an API base URL and a set of credentials.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
    auth: ClientAuth,
}

impl GitHubClient {
    fn new(http: reqwest::Client, base_url: Url, auth: ClientAuth) -> Self {
        Self {
            http,
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &ClientAuth {
        &self.auth
    }

    /// Start a request against `path`, relative to the API base URL.
    ///
    /// The GitHub media type, user agent and credentials are already set.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use hook_router_core::auth::GitHubClient;
    /// # async fn example(client: GitHubClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let response = client
    ///     .request(reqwest::Method::GET, "/repos/octocat/hello-world")?
    ///     .send()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl {
                message: format!("cannot join '{}' onto {}: {}", path, self.base_url, e),
            })?;

        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, CLIENT_USER_AGENT);
        if let Some(token) = self.auth.bearer() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Send a GET request and return the response if it succeeded.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self.request(Method::GET, path)?.send().await?;
        ensure_success(response).await
    }

    /// Send a POST request with a JSON body and return the response if it succeeded.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::HttpError {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// A GitHub App's identity, used by webhook handlers to act on GitHub.
pub struct GitHubApp {
    app_id: GitHubAppId,
    jwt_generator: Box<dyn JwtGenerator>,
    api_url: Url,
    http: reqwest::Client,
}

impl GitHubApp {
    /// Create an app from its ID, signing key and optional Enterprise API URL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPrivateKey` if the key cannot be used for
    /// RS256 signing, or `AuthError::ApiError` if `api_url` is not a valid URL.
    pub fn new(
        app_id: GitHubAppId,
        private_key: &PrivateKey,
        api_url: Option<&Url>,
    ) -> Result<Self, AuthError> {
        let jwt_generator = RS256JwtGenerator::new(private_key)?;
        let api_url = match api_url {
            Some(url) => normalize_base_url(url.clone()),
            None => Url::parse(DEFAULT_API_URL)
                .map(normalize_base_url)
                .map_err(|e| ApiError::InvalidUrl {
                    message: e.to_string(),
                })?,
        };

        Ok(Self {
            app_id,
            jwt_generator: Box::new(jwt_generator),
            api_url,
            http: reqwest::Client::new(),
        })
    }

    /// Create an app from validated settings.
    pub fn from_settings(settings: &GitHubAppSettings) -> Result<Self, AuthError> {
        Self::new(
            settings.app_id,
            &settings.private_key,
            settings.api_url.as_ref(),
        )
    }

    pub fn app_id(&self) -> GitHubAppId {
        self.app_id
    }

    /// API base URL all clients are bound to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Unauthenticated client.
    pub fn client(&self) -> GitHubClient {
        GitHubClient::new(self.http.clone(), self.api_url.clone(), ClientAuth::Anonymous)
    }

    /// Generate a fresh app JWT.
    pub fn jwt(&self) -> Result<JsonWebToken, AuthError> {
        self.jwt_generator.generate_jwt(self.app_id)
    }

    /// Client authenticated as the app itself.
    pub fn app_client(&self) -> Result<GitHubClient, AuthError> {
        let jwt = self.jwt()?;
        Ok(GitHubClient::new(
            self.http.clone(),
            self.api_url.clone(),
            ClientAuth::App(jwt),
        ))
    }

    /// Exchange an app JWT for an installation access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InstallationNotFound` when GitHub answers 404, and
    /// `AuthError::ApiError` for any other failure.
    #[instrument(skip(self), fields(app_id = %self.app_id))]
    pub async fn installation_token(
        &self,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, AuthError> {
        let path = format!("app/installations/{}/access_tokens", installation_id);
        let response = self
            .app_client()?
            .request(Method::POST, &path)?
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(installation_id = %installation_id, "Installation not found");
            return Err(AuthError::InstallationNotFound { installation_id });
        }
        let response = ensure_success(response).await?;

        let body: AccessTokenResponse = response.json().await.map_err(ApiError::from)?;
        debug!(
            installation_id = %installation_id,
            expires_at = %body.expires_at,
            "Installation token issued"
        );
        Ok(InstallationToken::new(
            body.token,
            installation_id,
            body.expires_at,
        ))
    }

    /// Client authenticated as the given installation.
    pub async fn installation_client(
        &self,
        installation_id: InstallationId,
    ) -> Result<GitHubClient, AuthError> {
        let token = self.installation_token(installation_id).await?;
        info!(installation_id = %installation_id, "Created installation client");
        Ok(GitHubClient::new(
            self.http.clone(),
            self.api_url.clone(),
            ClientAuth::Installation(token),
        ))
    }
}

impl std::fmt::Debug for GitHubApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApp")
            .field("app_id", &self.app_id)
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

// `Url::join` replaces the last path segment unless the base ends in '/'.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
