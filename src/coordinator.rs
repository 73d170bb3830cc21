//! Recovery Workflow Coordination
//!
//! Drives a `RecoverySession` through its stages: request a reset code,
//! verify it, re-trigger delivery. The coordinator owns the session and is
//! the only place its state is mutated. Each operation issues exactly one
//! gateway call and performs no implicit retry; callers must await an
//! operation to completion before issuing the next.

use crate::error::{RecoveryError, StorageError};
use crate::gateway::IdentityGateway;
use crate::session::{RecoverySession, Stage};
use crate::store::{DurableStore, EMAIL_KEY, TOKEN_KEY};
use std::sync::Arc;
use tracing::{info, warn};

/// Notice shown when the gateway acknowledges a delivery without a message
pub const CODE_SENT_MESSAGE: &str =
    "Password reset code has been sent to your email address.";

/// Notice shown when the gateway verifies a code without a message
pub const CODE_VERIFIED_MESSAGE: &str = "Reset code verified successfully!";

/// State machine driving one recovery attempt
pub struct RecoveryCoordinator {
    gateway: Arc<dyn IdentityGateway>,
    store: Arc<dyn DurableStore>,
    session: RecoverySession,
}

impl RecoveryCoordinator {
    /// Create a coordinator, rehydrating any attempt the store captured
    /// before a previous teardown.
    pub fn new(
        gateway: Arc<dyn IdentityGateway>,
        store: Arc<dyn DurableStore>,
    ) -> Result<Self, StorageError> {
        let session = RecoverySession::restore(store.as_ref())?;
        if session.stage != Stage::Idle {
            info!(stage = ?session.stage, "resumed recovery attempt from durable store");
        }
        Ok(Self {
            gateway,
            store,
            session,
        })
    }

    /// Read-only view of the current session
    pub fn session(&self) -> &RecoverySession {
        &self.session
    }

    /// Request delivery of a reset code to `email`.
    ///
    /// Permitted from any stage except `Verified`. Invoked from `CodeSent`
    /// this re-triggers delivery, optionally to a different address.
    pub async fn request_code(&mut self, email: &str) -> Result<String, RecoveryError> {
        if self.session.stage == Stage::Verified {
            return Err(RecoveryError::InvalidStage(
                "the attempt is already verified; clear it to start over".to_string(),
            ));
        }
        self.deliver_code(email.to_string()).await
    }

    /// Re-trigger delivery of a reset code to the address already on file.
    ///
    /// Fails with `MissingContext` when no address is resolvable from the
    /// session or the durable store. Never reverts the stage to `Idle`.
    pub async fn resend_code(&mut self) -> Result<String, RecoveryError> {
        if self.session.stage == Stage::Verified {
            return Err(RecoveryError::InvalidStage(
                "the attempt is already verified; clear it to start over".to_string(),
            ));
        }
        let email = self
            .resolve_email()?
            .ok_or(RecoveryError::MissingContext)?;
        self.deliver_code(email).await
    }

    /// Verify a code the user received.
    ///
    /// Requires an outstanding delivery (`CodeSent`). The address is taken
    /// from the session or, after a reload, from the durable store; when
    /// neither has it the operation fails locally with `MissingContext`
    /// before any network call. This is the only path that sets the token.
    pub async fn verify_code(&mut self, code: &str) -> Result<String, RecoveryError> {
        let email = self
            .resolve_email()?
            .ok_or(RecoveryError::MissingContext)?;
        match self.session.stage {
            Stage::CodeSent => {}
            Stage::Verified => {
                return Err(RecoveryError::InvalidStage(
                    "the attempt is already verified".to_string(),
                ));
            }
            _ => {
                return Err(RecoveryError::InvalidStage(
                    "no code is outstanding; request one first".to_string(),
                ));
            }
        }

        self.session.last_error = None;
        self.session.last_message = None;
        self.session.stage = Stage::VerifyPending;
        info!("verifying reset code");

        match self.gateway.verify_code(&email, code).await {
            Ok(ack) => {
                if let Some(token) = &ack.token {
                    if let Err(e) = self.store.set(TOKEN_KEY, token) {
                        return Err(self.fail(Stage::CodeSent, e.into()));
                    }
                }
                self.session.email = Some(email);
                self.session.stage = Stage::Verified;
                self.session.token = ack.token;
                let message = ack
                    .message
                    .unwrap_or_else(|| CODE_VERIFIED_MESSAGE.to_string());
                self.session.last_message = Some(message.clone());
                info!(token_issued = self.session.token.is_some(), "reset code verified");
                Ok(message)
            }
            Err(e) => Err(self.fail(Stage::CodeSent, e)),
        }
    }

    /// Tear down the attempt: forget the session and drop what the store
    /// holds. The sanctioned way to start over after `Verified`, and the
    /// teardown hook for leaving the flow entirely.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(EMAIL_KEY)?;
        self.store.remove(TOKEN_KEY)?;
        self.session = RecoverySession::new();
        info!("recovery session cleared");
        Ok(())
    }

    /// Shared delivery path for first requests and resends, so the two can
    /// never diverge in success/failure handling.
    async fn deliver_code(&mut self, email: String) -> Result<String, RecoveryError> {
        let prior = self.session.stage;
        self.session.last_error = None;
        self.session.last_message = None;
        if matches!(prior, Stage::Idle | Stage::Failed) {
            self.session.stage = Stage::RequestPending;
        }
        info!("requesting reset code delivery");

        match self.gateway.request_reset(&email).await {
            Ok(ack) => {
                if let Err(e) = self.store.set(EMAIL_KEY, &email) {
                    return Err(self.fail(Self::fallback_stage(prior), e.into()));
                }
                self.session.email = Some(email);
                self.session.stage = Stage::CodeSent;
                let message = ack.message.unwrap_or_else(|| CODE_SENT_MESSAGE.to_string());
                self.session.last_message = Some(message.clone());
                info!("reset code delivery acknowledged");
                Ok(message)
            }
            Err(e) => Err(self.fail(Self::fallback_stage(prior), e)),
        }
    }

    /// The address for the current attempt, from the session or from what
    /// the store captured before a reload.
    fn resolve_email(&self) -> Result<Option<String>, RecoveryError> {
        if let Some(email) = &self.session.email {
            return Ok(Some(email.clone()));
        }
        Ok(self.store.get(EMAIL_KEY)?)
    }

    /// Record a failure without advancing the workflow: the stage lands on
    /// `landing`, the message is surfaced on the session, and the error is
    /// handed back for the caller to retry explicitly.
    fn fail(&mut self, landing: Stage, error: RecoveryError) -> RecoveryError {
        self.session.stage = landing;
        self.session.last_error = Some(error.to_string());
        warn!(error = %error, stage = ?landing, "recovery operation failed");
        error
    }

    /// Where a failed delivery lands: fresh attempts fall to `Failed`, an
    /// attempt that already has a code out keeps its stage.
    fn fallback_stage(prior: Stage) -> Stage {
        if matches!(prior, Stage::Idle | Stage::Failed) {
            Stage::Failed
        } else {
            prior
        }
    }
}
