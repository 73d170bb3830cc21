//! Error types for the account recovery workflow.

use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid store value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Workflow-surface errors for the recovery coordinator and its collaborators
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected: {0}")]
    Validation(String),

    #[error("Expired or invalid code: {0}")]
    ExpiredOrInvalidCode(String),

    #[error("No recovery attempt in progress: request a reset code first")]
    MissingContext,

    #[error("Operation not available at this step: {0}")]
    InvalidStage(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for RecoveryError {
    fn from(err: config::ConfigError) -> Self {
        RecoveryError::Config(err.to_string())
    }
}
