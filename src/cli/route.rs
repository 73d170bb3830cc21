//! CLI route: wire configuration into a coordinator and dispatch commands.

use crate::cli::output::format_status_text;
use crate::cli::parse::{Cli, Commands};
use crate::config::{ConfigLoader, RegainConfig};
use crate::coordinator::RecoveryCoordinator;
use crate::error::RecoveryError;
use crate::gateway::HttpIdentityGateway;
use crate::store::SledDurableStore;
use dialoguer::Input;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;

/// Execution context for CLI commands
pub struct RunContext {
    coordinator: RecoveryCoordinator,
}

impl RunContext {
    /// Build the context from CLI arguments layered over configuration.
    pub fn new(cli: &Cli) -> Result<Self, RecoveryError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        if let Some(url) = &cli.gateway_url {
            config.gateway.base_url = url.clone();
        }
        if let Some(path) = &cli.store_path {
            config.storage.store_path = path.clone();
        }
        config.validate().map_err(RecoveryError::Config)?;
        Self::from_config(&config)
    }

    /// Build the context from an already-resolved configuration.
    pub fn from_config(config: &RegainConfig) -> Result<Self, RecoveryError> {
        let gateway = HttpIdentityGateway::with_timeouts(
            config.gateway.base_url.clone(),
            Duration::from_secs(config.gateway.connect_timeout_secs),
            Duration::from_secs(config.gateway.request_timeout_secs),
        )?;
        let store = SledDurableStore::new(&config.storage.store_path)?;
        let coordinator = RecoveryCoordinator::new(Arc::new(gateway), Arc::new(store))?;
        Ok(Self { coordinator })
    }

    /// Execute a command, returning the text to print on stdout.
    pub async fn execute(&mut self, command: &Commands) -> anyhow::Result<String> {
        match command {
            Commands::Request { email } => {
                let message = self.coordinator.request_code(email).await?;
                Ok(format!("{}", message.green()))
            }
            Commands::Verify { code } => {
                let message = self.coordinator.verify_code(code).await?;
                Ok(self.verified_output(&message))
            }
            Commands::Resend => {
                let message = self.coordinator.resend_code().await?;
                Ok(format!("{}", message.green()))
            }
            Commands::Status { format } => {
                if format == "json" {
                    Ok(serde_json::to_string_pretty(self.coordinator.session())?)
                } else {
                    Ok(format_status_text(self.coordinator.session()))
                }
            }
            Commands::Clear => {
                self.coordinator.clear()?;
                Ok("Recovery attempt cleared.".to_string())
            }
            Commands::Run => self.run_interactive().await,
        }
    }

    /// Interactive flow: prompt for the address, then loop on code entry
    /// with a `resend` escape hatch until verification succeeds.
    async fn run_interactive(&mut self) -> anyhow::Result<String> {
        let email: String = Input::new().with_prompt("Account email").interact_text()?;
        let message = self.coordinator.request_code(email.trim()).await?;
        println!("{}", message.green());

        loop {
            let entry: String = Input::new()
                .with_prompt("Reset code (or 'resend')")
                .interact_text()?;
            let entry = entry.trim();

            if entry.eq_ignore_ascii_case("resend") {
                match self.coordinator.resend_code().await {
                    Ok(message) => println!("{}", message.green()),
                    Err(e) => println!("{}", e.to_string().red()),
                }
                continue;
            }

            match self.coordinator.verify_code(entry).await {
                Ok(message) => return Ok(self.verified_output(&message)),
                Err(e) => match e {
                    RecoveryError::Storage(_)
                    | RecoveryError::InvalidStage(_)
                    | RecoveryError::MissingContext => return Err(e.into()),
                    _ => println!("{}", e.to_string().red()),
                },
            }
        }
    }

    fn verified_output(&self, message: &str) -> String {
        match self.coordinator.session().token.as_deref() {
            Some(token) => format!(
                "{}\nRecovery token (use it to set a new password): {}",
                message.green(),
                token
            ),
            None => format!("{}", message.green()),
        }
    }
}
