//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{AppConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting the configuration environment.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A loaded, validated configuration.
///
/// Keeps the raw TOML table next to the typed view so application code can
/// read keys the schema does not know about.
#[derive(Debug, Clone)]
pub struct Configuration {
    app: AppConfig,
    raw: toml::Table,
}

impl Configuration {
    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: toml::Table = content.parse()?;
        let app: AppConfig = toml::Value::Table(raw.clone()).try_into()?;
        validate_config(&app).map_err(ConfigError::Validation)?;
        Ok(Self { app, raw })
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Look up a dotted key such as `database.path`.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut current = self.raw.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    /// Dotted lookup of a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            raw: toml::Table::new(),
        }
    }
}

/// Environment from `APP_ENVIRONMENT`, defaulting to development.
pub fn environment_from_env() -> Environment {
    std::env::var(ENVIRONMENT_VAR)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

/// File to load for `env`: `config.<env>.toml` if present, else `config.toml`.
pub fn config_path(dir: &Path, env: Environment) -> PathBuf {
    let specific = dir.join(format!("config.{}.toml", env.as_str()));
    if specific.is_file() {
        specific
    } else {
        dir.join("config.toml")
    }
}

/// Load and validate configuration for `env` from `dir`.
///
/// The selected environment overrides `application.environment` in the file.
pub fn load_config(dir: &Path, env: Environment) -> Result<Configuration, ConfigError> {
    let path = config_path(dir, env);
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    let mut config = Configuration::from_toml(&content)?;
    config.app.application.environment = env;
    tracing::debug!(path = %path.display(), environment = %env, "Configuration file read");
    Ok(config)
}
