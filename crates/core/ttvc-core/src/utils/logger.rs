//! Logging utilities

use crate::config::{get_env_or, LOG_LEVEL_VAR};
use crate::{Result, TtvcError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive when neither `RUST_LOG` nor `TTVC_LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve the filter directive: explicit override, then `TTVC_LOG_LEVEL`, then default
pub fn resolve_level(override_level: Option<&str>) -> String {
    match override_level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) => level.to_string(),
        None => get_env_or(LOG_LEVEL_VAR, DEFAULT_LOG_LEVEL),
    }
}

/// Initialize the global logging system
///
/// `RUST_LOG` wins over everything; otherwise `level` (or `TTVC_LOG_LEVEL`) is used.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let level = resolve_level(level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&level))
        .map_err(|e| TtvcError::config(format!("invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| TtvcError::other(format!("logging already initialized: {}", e)))
}
