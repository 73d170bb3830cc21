//! CLI parse: clap types for Regain. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Regain CLI - account recovery workflow
#[derive(Parser)]
#[command(name = "regain")]
#[command(about = "Request, verify, and manage password-recovery codes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Identity gateway base URL (overrides configuration)
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Durable store directory (overrides configuration)
    #[arg(long)]
    pub store_path: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Request delivery of a reset code
    Request {
        /// Address the account is registered under
        email: String,
    },
    /// Verify a received reset code
    Verify {
        /// The code from the reset email
        code: String,
    },
    /// Re-send the reset code to the address already on file
    Resend,
    /// Show the current recovery attempt
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Abandon the current recovery attempt
    Clear,
    /// Walk the full recovery flow interactively
    Run,
}
