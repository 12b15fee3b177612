//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Resolve the filter from `RUST_LOG`, then config, then a default
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Later calls are ignored so tests can initialise freely

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when neither `RUST_LOG` nor configuration set one.
pub const DEFAULT_FILTER: &str = "roots=info,tower_http=info";

/// Pick the filter directive: `RUST_LOG`, else `logging.level`, else default.
pub fn resolve_filter(env_value: Option<&str>, config: &LoggingConfig) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .or(config.level.as_deref())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_filter(env_value.as_deref(), config);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
