//! Configuration loading from a directory of TOML files.

use std::fs;

use roots::config::{load_config, ConfigError, Environment};

const BASE: &str = r#"
[application]
name = "base"

[database]
path = ":memory:"
"#;

const PRODUCTION: &str = r#"
[application]
name = "prod"

[listener]
bind_address = "0.0.0.0:80"

[responses]
error_view = "errors/500"
"#;

#[test]
fn test_environment_file_preferred() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), BASE).unwrap();
    fs::write(dir.path().join("config.production.toml"), PRODUCTION).unwrap();

    let config = load_config(dir.path(), Environment::Production).unwrap();
    assert_eq!(config.app().application.name, "prod");
    assert_eq!(config.app().application.environment, Environment::Production);
    assert_eq!(config.get_str("responses.error_view"), Some("errors/500"));
    assert_eq!(config.app().responses.error_view.as_deref(), Some("errors/500"));
}

#[test]
fn test_falls_back_to_base_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), BASE).unwrap();

    let config = load_config(dir.path(), Environment::Development).unwrap();
    assert_eq!(config.app().application.name, "base");
    assert_eq!(config.app().database.path, ":memory:");
    assert_eq!(config.app().listener.request_timeout_secs, 30);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path(), Environment::Development).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[database]\ndriver = \"oracle\"\n\n[metrics]\nenabled = true\naddress = \"nope\"\n",
    )
    .unwrap();

    match load_config(dir.path(), Environment::Development) {
        Err(ConfigError::Validation(errors)) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["database.driver", "metrics.address"]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}
