//! Identity Gateway Abstraction
//!
//! Contract for the remote identity provider that delivers reset codes and
//! verifies them. The gateway is the sole authority on code validity, expiry,
//! and server-side email format; the coordinator performs no independent
//! verification of the code's content.

use crate::error::RecoveryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Acknowledgement for a reset-code delivery request
#[derive(Debug, Clone, Deserialize)]
pub struct ResetAck {
    pub message: Option<String>,
}

/// Acknowledgement for a code verification
///
/// Token issuance is optional per deployment: `token` is either fully
/// present or fully absent, never partially valid.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyAck {
    pub message: Option<String>,
    pub token: Option<String>,
}

/// Identity gateway client trait
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Trigger out-of-band delivery of a reset code to `email`
    async fn request_reset(&self, email: &str) -> Result<ResetAck, RecoveryError>;

    /// Validate a code the user received; may issue a recovery token
    async fn verify_code(&self, email: &str, code: &str) -> Result<VerifyAck, RecoveryError>;
}

// Wire request/response structures for the HTTP gateway
#[derive(Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull a human-readable message out of an error response body, falling
/// back to the raw text when the body is not the expected JSON shape.
fn extract_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            return message;
        }
    }
    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}

// Helper function to map transport-level errors to RecoveryError
fn map_http_error(error: reqwest::Error) -> RecoveryError {
    if error.is_timeout() {
        RecoveryError::Network(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        RecoveryError::Network(format!("Connection error: {}", error))
    } else {
        RecoveryError::Network(format!("HTTP error: {}", error))
    }
}

/// Classify a non-success status from the reset-request endpoint
fn classify_reset_failure(status: u16, message: String) -> RecoveryError {
    match status {
        400 | 422 => RecoveryError::Validation(message),
        _ => RecoveryError::Gateway(format!("Request failed with status {}: {}", status, message)),
    }
}

/// Classify a non-success status from the verification endpoint
fn classify_verify_failure(status: u16, message: String) -> RecoveryError {
    match status {
        400 | 422 => RecoveryError::Validation(message),
        401 | 403 | 404 | 410 => RecoveryError::ExpiredOrInvalidCode(message),
        _ => RecoveryError::Gateway(format!("Request failed with status {}: {}", status, message)),
    }
}

const GATEWAY_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const GATEWAY_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn build_gateway_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Client, RecoveryError> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| RecoveryError::Gateway(format!("Failed to create HTTP client: {}", e)))
}

/// HTTP identity gateway client
///
/// Posts JSON to the deployment's password-reset endpoints under `base_url`.
pub struct HttpIdentityGateway {
    client: Client,
    base_url: String,
}

impl HttpIdentityGateway {
    pub fn new(base_url: String) -> Result<Self, RecoveryError> {
        Self::with_timeouts(
            base_url,
            GATEWAY_HTTP_CONNECT_TIMEOUT,
            GATEWAY_HTTP_REQUEST_TIMEOUT,
        )
    }

    pub fn with_timeouts(
        base_url: String,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, RecoveryError> {
        let client = build_gateway_http_client(connect_timeout, request_timeout)?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Base URL the client was configured with
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl IdentityGateway for HttpIdentityGateway {
    async fn request_reset(&self, email: &str) -> Result<ResetAck, RecoveryError> {
        let url = format!("{}/auth/password-reset/request", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ResetRequest { email })
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_reset_failure(
                status.as_u16(),
                extract_message(&error_text),
            ));
        }

        let ack: ResetAck = response
            .json()
            .await
            .map_err(|e| RecoveryError::Gateway(format!("Failed to parse response: {}", e)))?;
        Ok(ack)
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<VerifyAck, RecoveryError> {
        let url = format!("{}/auth/password-reset/verify", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&VerifyRequest { email, code })
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_verify_failure(
                status.as_u16(),
                extract_message(&error_text),
            ));
        }

        let ack: VerifyAck = response
            .json()
            .await
            .map_err(|e| RecoveryError::Gateway(format!("Failed to parse response: {}", e)))?;
        Ok(ack)
    }
}
