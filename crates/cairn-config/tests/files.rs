//! Loading configuration from files on disk.

use cairn_config::{AuthorizationMode, ConfigError, ConfigLoader, LogFormat};
use std::io::Write;
use tempfile::NamedTempFile;

fn file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file_with_rules() {
    let file = file_with(
        ".toml",
        r#"
            [server]
            base_url = "https://pod.example/"

            [storage]
            locking = false

            [authorization]
            mode = "acl"

            [[authorization.rules]]
            path = "public/"
            agent = "public"
            modes = ["read"]
            inherit = true
            hidden_attributes = ["owner"]

            [telemetry.logging]
            format = "pretty"
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.server.base_url, "https://pod.example/");
    assert!(!config.storage.locking);
    assert!(config.storage.validation);
    assert_eq!(config.authorization.mode, AuthorizationMode::Acl);
    assert_eq!(config.authorization.rules.len(), 1);
    assert_eq!(config.authorization.rules[0].hidden_attributes, ["owner"]);
    assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
}

#[test]
fn test_json_file() {
    let file = file_with(
        ".json",
        r#"{"authorization": {"mode": "allow_all"}, "telemetry": {"metrics": {"enabled": false}}}"#,
    );

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.authorization.mode, AuthorizationMode::AllowAll);
    assert!(!config.telemetry.metrics.enabled);
}

#[test]
fn test_unknown_field_in_file_fails() {
    let file = file_with(".toml", "[storage]\ncompression = true\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_unsupported_extension() {
    let file = file_with(".yaml", "server: {}\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_invalid_rule_fails_on_load() {
    let file = file_with(
        ".toml",
        r#"
            [[authorization.rules]]
            path = ""
            agent = "public"
            modes = ["read", "sudo"]
        "#,
    );

    let result = ConfigLoader::new().with_file(file.path()).unwrap().load();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}
