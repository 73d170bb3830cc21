//! Configuration System
//!
//! Layered runtime configuration for the recovery workflow: built-in
//! defaults, then an optional TOML file, then REGAIN_-prefixed environment
//! variables (e.g. REGAIN_GATEWAY__BASE_URL).

use crate::error::RecoveryError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegainConfig {
    /// Identity gateway endpoint
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Durable store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity gateway endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the identity provider's API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Durable store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the sled-backed durable store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    ProjectDirs::from("", "", "regain")
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from(".regain/store"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl RegainConfig {
    /// Validate the resolved configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.gateway.base_url.trim().is_empty() {
            return Err("gateway.base_url must not be empty".to_string());
        }
        if self.storage.store_path.as_os_str().is_empty() {
            return Err("storage.store_path must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration loader
///
/// Precedence (lowest to highest): defaults, `config.toml` in the working
/// directory (or an explicit file passed on the command line), environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, optionally from an explicit file path.
    /// An explicit path must exist; the implicit `config.toml` need not.
    pub fn load(file: Option<&Path>) -> Result<RegainConfig, RecoveryError> {
        let mut builder = Config::builder();

        match file {
            Some(path) => {
                let path = path.to_str().ok_or_else(|| {
                    RecoveryError::Config(format!("config path is not valid UTF-8: {:?}", path))
                })?;
                builder = builder.add_source(File::with_name(path).required(true));
            }
            None => {
                builder = builder.add_source(File::with_name("config").required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("REGAIN")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: RegainConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
