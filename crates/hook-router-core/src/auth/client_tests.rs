//! Tests for GitHub App clients.

use super::*;
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/test-data/app_key.pem"
));

fn test_app(api_url: &str) -> GitHubApp {
    let key = PrivateKey::from_pem(TEST_KEY_PEM).unwrap();
    let url = Url::parse(api_url).unwrap();
    GitHubApp::new(GitHubAppId::new(12345), &key, Some(&url)).unwrap()
}

mod construction_tests {
    use super::*;

    #[test]
    fn test_defaults_to_public_api() {
        let key = PrivateKey::from_pem(TEST_KEY_PEM).unwrap();
        let app = GitHubApp::new(GitHubAppId::new(1), &key, None).unwrap();

        assert_eq!(app.api_url().as_str(), "https://api.github.com/");
        assert_eq!(app.client().base_url().as_str(), "https://api.github.com/");
    }

    /// Enterprise API roots carry a path; requests must be nested under it.
    #[test]
    fn test_enterprise_url_keeps_its_path() {
        let app = test_app("https://ghe.example.com/api/v3");
        let request = app
            .client()
            .request(Method::GET, "/repos/octocat/hello")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://ghe.example.com/api/v3/repos/octocat/hello"
        );
    }

    #[test]
    fn test_anonymous_client_sends_no_authorization() {
        let app = test_app("https://api.github.com");
        let request = app
            .client()
            .request(Method::GET, "rate_limit")
            .unwrap()
            .build()
            .unwrap();

        assert!(request.headers().get("authorization").is_none());
        assert_eq!(
            request.headers().get("accept").unwrap(),
            "application/vnd.github+json"
        );
    }

    #[test]
    fn test_app_client_uses_jwt_bearer() {
        let app = test_app("https://api.github.com");
        let client = app.app_client().unwrap();

        let jwt = match client.auth() {
            ClientAuth::App(jwt) => jwt.clone(),
            other => panic!("expected app auth, got {other:?}"),
        };
        assert_eq!(jwt.app_id(), GitHubAppId::new(12345));

        let request = client.request(Method::GET, "app").unwrap().build().unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            format!("Bearer {}", jwt.token()).as_str()
        );
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let app = test_app("https://api.github.com");
        let debug = format!("{app:?}");
        assert!(debug.contains("12345"));
        assert!(!debug.contains("PRIVATE KEY"));
    }
}

mod installation_tests {
    use super::*;

    #[tokio::test]
    async fn test_installation_token_exchange() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app/installations/42/access_tokens"))
            .and(header("Accept", "application/vnd.github+json"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "token": "ghs_installation_token",
                "expires_at": "2030-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let token = app
            .installation_token(InstallationId::new(42))
            .await
            .expect("token exchange should succeed");

        assert_eq!(token.token(), "ghs_installation_token");
        assert_eq!(token.installation_id(), InstallationId::new(42));
        assert_eq!(token.expires_at().to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_installation_client_authenticates_with_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app/installations/7/access_tokens"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "token": "ghs_seven",
                "expires_at": "2030-01-01T00:00:00Z"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world"))
            .and(header("Authorization", "Bearer ghs_seven"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let client = app
            .installation_client(InstallationId::new(7))
            .await
            .unwrap();

        let response = client.get("/repos/octocat/hello-world").await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_unknown_installation_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app/installations/99/access_tokens"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found"
            })))
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let result = app.installation_token(InstallationId::new(99)).await;

        match result {
            Err(AuthError::InstallationNotFound { installation_id }) => {
                assert_eq!(installation_id, InstallationId::new(99))
            }
            other => panic!("expected InstallationNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app/installations/5/access_tokens"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let app = test_app(&mock_server.uri());
        let result = app.installation_token(InstallationId::new(5)).await;

        match result {
            Err(AuthError::ApiError(ApiError::HttpError { status, message })) => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("expected HttpError, got {other:?}"),
        }
    }
}
