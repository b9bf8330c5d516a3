//! Tests for GitHub App configuration validation.

use super::*;

const TEST_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/test-data/app_key.pem"
));

fn complete() -> GitHubAppConfig {
    GitHubAppConfig {
        id: Some(12345),
        key: Some(TEST_KEY_PEM.to_string()),
        secret: Some("topsecret".to_string()),
        url: None,
        route: None,
    }
}

fn assert_missing(config: GitHubAppConfig, expected_key: &str) {
    match config.validate() {
        Err(ConfigError::Missing { key }) => assert_eq!(key, expected_key),
        other => panic!("expected missing {expected_key}, got {other:?}"),
    }
}

#[test]
fn test_complete_config_validates_with_defaults() {
    let settings = complete().validate().unwrap();

    assert_eq!(settings.app_id, GitHubAppId::new(12345));
    assert_eq!(settings.webhook_secret.as_bytes(), b"topsecret");
    assert!(settings.api_url.is_none());
    assert_eq!(settings.route, "/");
}

#[test]
fn test_missing_id_is_reported() {
    assert_missing(GitHubAppConfig { id: None, ..complete() }, "GITHUBAPP_ID");
    assert_missing(
        GitHubAppConfig {
            id: Some(0),
            ..complete()
        },
        "GITHUBAPP_ID",
    );
}

#[test]
fn test_missing_key_is_reported() {
    assert_missing(GitHubAppConfig { key: None, ..complete() }, "GITHUBAPP_KEY");
    assert_missing(
        GitHubAppConfig {
            key: Some("  ".to_string()),
            ..complete()
        },
        "GITHUBAPP_KEY",
    );
}

#[test]
fn test_missing_secret_is_reported() {
    assert_missing(
        GitHubAppConfig {
            secret: None,
            ..complete()
        },
        "GITHUBAPP_SECRET",
    );
    assert_missing(
        GitHubAppConfig {
            secret: Some(String::new()),
            ..complete()
        },
        "GITHUBAPP_SECRET",
    );
}

/// With everything missing, the ID is reported first.
#[test]
fn test_required_settings_checked_in_order() {
    assert_missing(GitHubAppConfig::default(), "GITHUBAPP_ID");
    assert_missing(
        GitHubAppConfig {
            id: Some(1),
            ..GitHubAppConfig::default()
        },
        "GITHUBAPP_KEY",
    );
}

#[test]
fn test_invalid_key_is_reported() {
    let config = GitHubAppConfig {
        key: Some("not a key".to_string()),
        ..complete()
    };
    match config.validate() {
        Err(ConfigError::Invalid { message }) => assert!(message.starts_with("GITHUBAPP_KEY")),
        other => panic!("expected invalid key, got {other:?}"),
    }
}

#[test]
fn test_key_with_escaped_newlines_is_accepted() {
    let config = GitHubAppConfig {
        key: Some(TEST_KEY_PEM.trim().replace('\n', "\\n")),
        ..complete()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_enterprise_url_and_route() {
    let config = GitHubAppConfig {
        url: Some("https://ghe.example.com/api/v3".to_string()),
        route: Some("/github/webhook".to_string()),
        ..complete()
    };
    let settings = config.validate().unwrap();

    assert_eq!(
        settings.api_url.unwrap().as_str(),
        "https://ghe.example.com/api/v3"
    );
    assert_eq!(settings.route, "/github/webhook");
}

#[test]
fn test_empty_url_means_public_github() {
    let config = GitHubAppConfig {
        url: Some(String::new()),
        ..complete()
    };
    assert!(config.validate().unwrap().api_url.is_none());
}

#[test]
fn test_invalid_url_and_route_are_rejected() {
    let bad_url = GitHubAppConfig {
        url: Some("not a url".to_string()),
        ..complete()
    };
    assert!(matches!(bad_url.validate(), Err(ConfigError::Invalid { .. })));

    let bad_route = GitHubAppConfig {
        route: Some("webhook".to_string()),
        ..complete()
    };
    assert!(matches!(
        bad_route.validate(),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn test_merge_prefers_overrides() {
    let base = GitHubAppConfig {
        id: Some(1),
        route: Some("/base".to_string()),
        ..GitHubAppConfig::default()
    };
    let overrides = GitHubAppConfig {
        id: Some(2),
        secret: Some("s".to_string()),
        ..GitHubAppConfig::default()
    };

    let merged = base.merge(overrides);
    assert_eq!(merged.id, Some(2));
    assert_eq!(merged.secret.as_deref(), Some("s"));
    assert_eq!(merged.route.as_deref(), Some("/base"));
}

#[test]
fn test_debug_redacts_secrets() {
    let debug = format!("{:?}", complete());
    assert!(!debug.contains("topsecret"));
    assert!(!debug.contains("PRIVATE KEY"));
    assert!(debug.contains("12345"));
}

#[test]
fn test_id_deserializes_from_number_or_string() {
    let from_number: GitHubAppConfig = serde_json::from_str(r#"{"id": 42}"#).unwrap();
    assert_eq!(from_number.id, Some(42));

    let from_string: GitHubAppConfig = serde_json::from_str(r#"{"id": " 123 "}"#).unwrap();
    assert_eq!(from_string.id, Some(123));

    let from_empty: GitHubAppConfig = serde_json::from_str(r#"{"id": ""}"#).unwrap();
    assert_eq!(from_empty.id, None);

    let absent: GitHubAppConfig = serde_json::from_str(r#"{"secret": "s"}"#).unwrap();
    assert_eq!(absent.id, None);

    assert!(serde_json::from_str::<GitHubAppConfig>(r#"{"id": "twelve"}"#).is_err());
}
