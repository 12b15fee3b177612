//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an
//! application. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for an application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application identity and environment.
    pub application: ApplicationConfig,

    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Data store connection.
    pub database: DatabaseConfig,

    pub logging: LoggingConfig,

    pub metrics: MetricsConfig,

    /// Views rendered for error responses.
    pub responses: ResponsesConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Whether error details may be shown to clients.
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,

    pub environment: Environment,

    /// Directory holding `<name>.html` view templates.
    pub views_dir: String,

    /// Bearer token accepted by the `auth` middleware. Empty disables it.
    pub api_key: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "roots".to_string(),
            environment: Environment::Development,
            views_dir: "views".to_string(),
            api_key: String::new(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout.
    pub request_timeout_secs: u64,

    /// Maximum request body size.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Only `sqlite` is implemented.
    pub driver: String,

    /// Database file, or `:memory:`.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            path: "roots.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,

    /// Prometheus scrape endpoint address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResponsesConfig {
    /// View rendered for unmatched routes.
    pub not_found_view: Option<String>,

    /// View rendered for errors, with `status` and `message` data.
    pub error_view: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.database.driver, "sqlite");
        assert_eq!(config.application.environment, Environment::Development);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [application]
            environment = "production"

            [listener]
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.application.environment, Environment::Production);
        assert_eq!(config.application.views_dir, "views");
        assert_eq!(config.listener.request_timeout_secs, 5);
        assert_eq!(config.listener.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Production));
        assert!("staging".parse::<Environment>().is_err());
    }
}
