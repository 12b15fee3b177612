//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.<env>.toml (or config.toml)
//!     → loader.rs (parse & deserialize, keep raw table)
//!     → validation.rs (semantic checks)
//!     → Configuration (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Configuration};
pub use schema::{
    AppConfig, ApplicationConfig, DatabaseConfig, Environment, ListenerConfig, LoggingConfig,
    MetricsConfig, ResponsesConfig,
};
pub use validation::ValidationError;
