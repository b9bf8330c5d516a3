//! Tests for [`ServiceConfig`] loading and validation.

use super::*;
use serial_test::serial;
use std::io::Write;

const ENV_VARS: &[&str] = &[
    "HOOK_ROUTER_CONFIG_FILE",
    "HOOK_ROUTER__SERVER__PORT",
    "HOOK_ROUTER__LOGGING__LEVEL",
    "GITHUBAPP_ID",
    "GITHUBAPP_KEY",
    "GITHUBAPP_SECRET",
    "GITHUBAPP_URL",
    "GITHUBAPP_ROUTE",
];

fn clear_env() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

mod defaults_tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
    }

    #[test]
    fn test_invalid_server_values_are_rejected() {
        let mut config = ServiceConfig::default();
        config.server.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = ServiceConfig::default();
        config.server.host = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.server.max_body_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut config = ServiceConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    /// Without app settings the service must refuse to start.
    #[test]
    fn test_github_app_settings_require_id() {
        let config = ServiceConfig::default();
        match config.github_app_settings() {
            Err(ConfigError::GitHubApp(hook_router_core::ConfigError::Missing { key })) => {
                assert_eq!(key, "GITHUBAPP_ID")
            }
            other => panic!("expected missing GITHUBAPP_ID, got {other:?}"),
        }
    }
}

mod loading_tests {
    use super::*;

    #[test]
    #[serial]
    fn test_load_from_yaml_file() {
        clear_env();
        let file = yaml_file(
            r#"
server:
  port: 9191
  timeout_seconds: 5
logging:
  json_format: true
github_app:
  id: 42
  secret: "from-file"
  route: "/hooks"
"#,
        );

        let config = ServiceConfig::load_from(Some(file.path())).unwrap();

        assert_eq!(config.server.port, 9191);
        assert_eq!(config.server.timeout_seconds, 5);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.logging.json_format);
        assert_eq!(config.github_app.id, Some(42));
        assert_eq!(config.github_app.secret.as_deref(), Some("from-file"));
        assert_eq!(config.github_app.route.as_deref(), Some("/hooks"));
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        clear_env();
        let result = ServiceConfig::load_from(Some(Path::new("/nonexistent/hook-router.yaml")));
        assert!(matches!(result, Err(ConfigError::Loading(_))));
    }

    #[test]
    #[serial]
    fn test_prefixed_environment_overrides_file() {
        clear_env();
        let file = yaml_file("server:\n  port: 9191\n");
        std::env::set_var("HOOK_ROUTER__SERVER__PORT", "7070");
        std::env::set_var("HOOK_ROUTER__LOGGING__LEVEL", "debug");

        let config = ServiceConfig::load_from(Some(file.path()));
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.server.port, 7070);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    #[serial]
    fn test_githubapp_variables_override_app_section() {
        clear_env();
        let file = yaml_file(
            r#"
github_app:
  id: 42
  secret: "from-file"
  route: "/hooks"
"#,
        );
        std::env::set_var("GITHUBAPP_ID", "777");
        std::env::set_var("GITHUBAPP_SECRET", "from-env");

        let config = ServiceConfig::load_from(Some(file.path()));
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.github_app.id, Some(777));
        assert_eq!(config.github_app.secret.as_deref(), Some("from-env"));
        assert_eq!(config.github_app.route.as_deref(), Some("/hooks"));
    }

    #[test]
    #[serial]
    fn test_load_reads_config_file_variable() {
        clear_env();
        let file = yaml_file("server:\n  port: 6060\n");
        std::env::set_var("HOOK_ROUTER_CONFIG_FILE", file.path());

        let config = ServiceConfig::load();
        clear_env();

        assert_eq!(config.unwrap().server.port, 6060);
    }
}

mod route_tests {
    use super::*;

    const TEST_KEY_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../hook-router-core/test-data/app_key.pem"
    ));

    fn config_with_route(route: &str) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.github_app = GitHubAppConfig {
            id: Some(1),
            key: Some(TEST_KEY_PEM.to_string()),
            secret: Some("s".to_string()),
            url: None,
            route: Some(route.to_string()),
        };
        config
    }

    #[test]
    fn test_reserved_routes_are_rejected() {
        for route in RESERVED_ROUTES {
            assert!(matches!(
                config_with_route(route).github_app_settings(),
                Err(ConfigError::Invalid { .. })
            ));
        }
    }

    #[test]
    fn test_custom_route_is_accepted() {
        let settings = config_with_route("/github").github_app_settings().unwrap();
        assert_eq!(settings.route, "/github");
    }
}
