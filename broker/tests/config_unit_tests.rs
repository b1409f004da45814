//! Configuration loading from a config directory
//!
//! These tests verify file parsing, service files, secrets and environment
//! overrides.

mod common;

use serial_test::serial;
use std::collections::HashMap;

use broker::config::ConfigManager;
use broker::ConfigError;
use common::fixtures::TestConfigBuilder;

const SO_URL: &str = "https://sap.example.com:44300/sap/bc/srt/rfc/sap/zws_bapi_salesorder_create";
const SO_ACTION: &str =
    "\"urn:sap-com:document:sap:rfc:functions:ZWS_BAPI_SALESORDER_CREATE:ZBAPI_SALESORDER_CREATERequest\"";

fn no_env(_: &str) -> Option<String> {
    None
}

#[tokio::test]
async fn test_defaults_apply_when_only_services_are_given() {
    let test_config = TestConfigBuilder::new()
        .with_service("SO", SO_URL, SO_ACTION)
        .build();

    let manager = ConfigManager::with_env(test_config.dir(), no_env).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.max_workers, 100);
    assert_eq!(config.request_timeout_seconds, 300);
    assert_eq!(config.transport_retries, 3);
    assert!(!config.accept_invalid_certs);
    assert!(config.default_credentials.is_none());

    let so = &config.services["SO"];
    assert_eq!(so.url, SO_URL);
    assert_eq!(so.action, SO_ACTION);
}

#[tokio::test]
async fn test_file_values_and_extra_service_files() {
    let test_config = TestConfigBuilder::new()
        .with_setting("port", "9000")
        .with_setting("max_workers", "16")
        .with_setting("request_timeout_seconds", "60")
        .with_setting("accept_invalid_certs", "true")
        .with_service("SO", SO_URL, SO_ACTION)
        .with_file(
            "material.toml",
            r#"
[services.MAT]
url = "https://sap.example.com:44300/material"
action = "urn:mat"
"#,
        )
        .build();

    let manager = ConfigManager::with_env(test_config.dir(), no_env).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.port, 9000);
    assert_eq!(config.max_workers, 16);
    assert_eq!(config.request_timeout_seconds, 60);
    assert!(config.accept_invalid_certs);
    assert_eq!(config.services.len(), 2);
    assert_eq!(config.services["MAT"].action, "urn:mat");
}

#[tokio::test]
async fn test_duplicate_service_is_rejected() {
    let test_config = TestConfigBuilder::new()
        .with_service("SO", SO_URL, SO_ACTION)
        .with_file(
            "extra.toml",
            "[services.SO]\nurl = \"https://other.example.com\"\naction = \"x\"\n",
        )
        .build();

    let err = ConfigManager::with_env(test_config.dir(), no_env)
        .await
        .err()
        .unwrap();
    let config_error = err.downcast_ref::<ConfigError>().unwrap();
    assert!(matches!(config_error, ConfigError::DuplicateService { code, .. } if code == "SO"));
}

#[tokio::test]
async fn test_secrets_file_provides_default_credentials() {
    let test_config = TestConfigBuilder::new()
        .with_service("SO", SO_URL, SO_ACTION)
        .with_secrets("RFC_SERVICE", "file-pw")
        .build();

    let manager = ConfigManager::with_env(test_config.dir(), no_env).await.unwrap();
    let pair = manager.get_current_config().default_credentials.clone().unwrap();
    assert_eq!(pair.user, "RFC_SERVICE");
    assert_eq!(pair.secret, "file-pw");
}

#[tokio::test]
async fn test_environment_wins_over_files() {
    let test_config = TestConfigBuilder::new()
        .with_setting("max_workers", "16")
        .with_service("SO", SO_URL, SO_ACTION)
        .with_secrets("RFC_SERVICE", "file-pw")
        .build();

    let env: HashMap<&str, &str> = [
        ("SAP_MAX_WORKERS", "4"),
        ("SAP_REQUEST_TIMEOUT", "30"),
        ("SAP_USER", "ENV_USER"),
        ("SAP_PASSWORD", "env-pw"),
    ]
    .into_iter()
    .collect();

    let manager = ConfigManager::with_env(test_config.dir(), |key: &str| {
        env.get(key).map(|v| v.to_string())
    })
    .await
    .unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.max_workers, 4);
    assert_eq!(config.request_timeout_seconds, 30);
    assert_eq!(config.default_credentials.as_ref().unwrap().user, "ENV_USER");
}

#[tokio::test]
async fn test_invalid_files_are_rejected() {
    let zero_workers = TestConfigBuilder::new()
        .with_setting("max_workers", "0")
        .with_service("SO", SO_URL, SO_ACTION)
        .build();
    assert!(ConfigManager::with_env(zero_workers.dir(), no_env).await.is_err());

    let no_services = TestConfigBuilder::new().with_setting("port", "9000").build();
    assert!(ConfigManager::with_env(no_services.dir(), no_env).await.is_err());

    let bad_toml = TestConfigBuilder::new().with_setting("port", "\"nope").build();
    assert!(ConfigManager::with_env(bad_toml.dir(), no_env).await.is_err());

    assert!(ConfigManager::with_env("/nonexistent/config".to_string(), no_env)
        .await
        .is_err());
}

#[tokio::test]
#[serial]
async fn test_process_environment_is_read() {
    let test_config = TestConfigBuilder::new()
        .with_service("SO", SO_URL, SO_ACTION)
        .build();

    std::env::set_var("SAP_MAX_WORKERS", "7");
    let result = ConfigManager::new(test_config.dir()).await;
    std::env::remove_var("SAP_MAX_WORKERS");

    assert_eq!(result.unwrap().get_current_config().max_workers, 7);
}

#[tokio::test]
#[serial]
async fn test_garbage_environment_value_fails_loading() {
    let test_config = TestConfigBuilder::new()
        .with_service("SO", SO_URL, SO_ACTION)
        .build();

    std::env::set_var("SAP_REQUEST_TIMEOUT", "soon");
    let result = ConfigManager::new(test_config.dir()).await;
    std::env::remove_var("SAP_REQUEST_TIMEOUT");

    assert!(result.is_err());
}
