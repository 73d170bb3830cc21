//! Logging System
//!
//! Structured logging via the `tracing` crate. Level and format come from
//! configuration, with the REGAIN_LOG environment variable taking
//! precedence over both.

use crate::error::RecoveryError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system
///
/// Logs go to stderr so command output on stdout stays machine-consumable.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), RecoveryError> {
    let filter = build_env_filter(config);
    let base_subscriber = Registry::default().with(filter);

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    let use_color = config.map(|c| c.color).unwrap_or(true);

    if format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| RecoveryError::Config(format!("Failed to initialize logging: {}", e)))
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| RecoveryError::Config(format!("Failed to initialize logging: {}", e)))
    }
}

/// Build the level filter: REGAIN_LOG environment variable first, then the
/// configured level, then the "info" default.
fn build_env_filter(config: Option<&LoggingConfig>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env("REGAIN_LOG") {
        return filter;
    }
    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    EnvFilter::new(level)
}
