//! Recovery Session Data Model
//!
//! One value records a single password-recovery attempt: the address the
//! reset was requested for, the position in the workflow, and the short-lived
//! credential handed out after verification. All workflow mutation happens
//! through `RecoveryCoordinator`; this module only maintains the shape.

use crate::error::StorageError;
use crate::store::{DurableStore, EMAIL_KEY, TOKEN_KEY};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Position in the ordered recovery workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No attempt in progress
    Idle,
    /// A code request is in flight to the gateway
    RequestPending,
    /// A code has been delivered; waiting for the user to enter it
    CodeSent,
    /// A code verification is in flight to the gateway
    VerifyPending,
    /// The code checked out; the recovery credential (if issued) is held
    Verified,
    /// A fresh request failed before a code was ever delivered
    Failed,
}

/// One user's in-progress attempt to regain account access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySession {
    pub email: Option<String>,
    pub stage: Stage,
    pub token: Option<String>,
    pub last_error: Option<String>,
    pub last_message: Option<String>,
}

impl Default for RecoverySession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoverySession {
    /// A blank session with no attempt in progress
    pub fn new() -> Self {
        Self {
            email: None,
            stage: Stage::Idle,
            token: None,
            last_error: None,
            last_message: None,
        }
    }

    /// Rebuild a session from what the durable store captured before a
    /// reload of the execution context.
    ///
    /// A stored token with no matching email is an inconsistent remnant; it
    /// is removed and the session starts over from `Idle`.
    pub fn restore(store: &dyn DurableStore) -> Result<Self, StorageError> {
        let email = store.get(EMAIL_KEY)?;
        let token = store.get(TOKEN_KEY)?;

        let session = match (email, token) {
            (Some(email), Some(token)) => Self {
                email: Some(email),
                stage: Stage::Verified,
                token: Some(token),
                last_error: None,
                last_message: None,
            },
            (Some(email), None) => Self {
                email: Some(email),
                stage: Stage::CodeSent,
                token: None,
                last_error: None,
                last_message: None,
            },
            (None, Some(_)) => {
                warn!("discarding stored recovery token with no matching email");
                store.remove(TOKEN_KEY)?;
                Self::new()
            }
            (None, None) => Self::new(),
        };
        Ok(session)
    }

    /// Whether the session's structural rules hold: a token may be present
    /// only at `Verified`, and every stage past `Idle`/`Failed` has an email.
    pub fn invariants_hold(&self) -> bool {
        if self.token.is_some() && self.stage != Stage::Verified {
            return false;
        }
        match self.stage {
            Stage::Idle | Stage::Failed => true,
            _ => self.email.is_some(),
        }
    }
}
