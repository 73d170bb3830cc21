//! CLI output: error mapping and status presentation.

use crate::session::{RecoverySession, Stage};
use owo_colors::OwoColorize;

/// Map errors to a string for CLI output.
/// Keeps route handlers thin; extend with stable categories if needed.
pub fn map_error(e: &anyhow::Error) -> String {
    e.to_string()
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "idle",
        Stage::RequestPending => "request pending",
        Stage::CodeSent => "code sent",
        Stage::VerifyPending => "verify pending",
        Stage::Verified => "verified",
        Stage::Failed => "failed",
    }
}

/// Render the current attempt for terminal display
pub fn format_status_text(session: &RecoverySession) -> String {
    let mut lines = vec![format!("Stage: {}", stage_label(session.stage).bold())];
    if let Some(email) = &session.email {
        lines.push(format!("Email: {}", email));
    }
    if let Some(token) = &session.token {
        lines.push(format!("Recovery token: {}", token));
    }
    if let Some(message) = &session.last_message {
        lines.push(format!("{}", message.green()));
    }
    if let Some(error) = &session.last_error {
        lines.push(format!("{}", error.red()));
    }
    lines.join("\n")
}
