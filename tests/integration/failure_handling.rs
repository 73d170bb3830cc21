//! Integration tests for failure handling and precondition short-circuits

use super::test_utils::ScriptedGateway;
use regain::coordinator::RecoveryCoordinator;
use regain::error::RecoveryError;
use regain::session::Stage;
use regain::store::{DurableStore, MemoryDurableStore, EMAIL_KEY, TOKEN_KEY};
use std::sync::Arc;

fn coordinator_with(
    gateway: &Arc<ScriptedGateway>,
    store: &Arc<MemoryDurableStore>,
) -> RecoveryCoordinator {
    RecoveryCoordinator::new(gateway.clone(), store.clone()).unwrap()
}

/// Verifying with no prior request must fail locally with zero network calls.
#[tokio::test]
async fn test_verify_before_request_short_circuits() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    let err = coordinator.verify_code("123456").await.unwrap_err();
    assert!(matches!(err, RecoveryError::MissingContext));
    assert_eq!(gateway.verify_call_count(), 0);
    assert_eq!(gateway.reset_call_count(), 0);
    assert_eq!(coordinator.session().stage, Stage::Idle);
}

#[tokio::test]
async fn test_resend_without_email_short_circuits() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    let err = coordinator.resend_code().await.unwrap_err();
    assert!(matches!(err, RecoveryError::MissingContext));
    assert_eq!(gateway.reset_call_count(), 0);
}

/// A failed first request records the error and leaves nothing behind: no
/// email on the session, nothing persisted, and a retry path open.
#[tokio::test]
async fn test_failed_request_records_error_without_partial_state() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    gateway.push_reset_err(RecoveryError::Network("connection refused".to_string()));
    let err = coordinator.request_code("a@b.com").await.unwrap_err();

    assert!(matches!(err, RecoveryError::Network(_)));
    assert_eq!(coordinator.session().stage, Stage::Failed);
    assert!(coordinator.session().email.is_none());
    assert!(coordinator.session().token.is_none());
    assert!(coordinator.session().last_error.is_some());
    assert_eq!(store.get(EMAIL_KEY).unwrap(), None);

    // The failure recovers back onto the request path
    gateway.push_reset_ok(None);
    coordinator.request_code("a@b.com").await.unwrap();
    assert_eq!(coordinator.session().stage, Stage::CodeSent);
    assert!(coordinator.session().last_error.is_none());
}

/// Re-requesting with a new address must not clobber the prior address when
/// the gateway rejects the new one.
#[tokio::test]
async fn test_failed_rerequest_keeps_existing_email() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    gateway.push_reset_ok(None);
    coordinator.request_code("a@b.com").await.unwrap();

    gateway.push_reset_err(RecoveryError::Validation("unknown address".to_string()));
    coordinator.request_code("typo@b.com").await.unwrap_err();

    assert_eq!(coordinator.session().stage, Stage::CodeSent);
    assert_eq!(coordinator.session().email.as_deref(), Some("a@b.com"));
    assert_eq!(store.get(EMAIL_KEY).unwrap().as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn test_failed_verify_leaves_code_sent_and_no_token() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    gateway.push_reset_ok(None);
    coordinator.request_code("a@b.com").await.unwrap();

    gateway.push_verify_err(RecoveryError::ExpiredOrInvalidCode("bad code".to_string()));
    coordinator.verify_code("000000").await.unwrap_err();

    assert_eq!(coordinator.session().stage, Stage::CodeSent);
    assert!(coordinator.session().token.is_none());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

    // The same code may be retried
    gateway.push_verify_ok(None, Some("tok_retry"));
    coordinator.verify_code("000000").await.unwrap();
    assert_eq!(coordinator.session().stage, Stage::Verified);
}

#[tokio::test]
async fn test_resend_failure_never_reverts_to_idle() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    gateway.push_reset_ok(None);
    coordinator.request_code("a@b.com").await.unwrap();

    gateway.push_reset_err(RecoveryError::Network("timeout".to_string()));
    coordinator.resend_code().await.unwrap_err();

    assert_eq!(coordinator.session().stage, Stage::CodeSent);
    assert_eq!(coordinator.session().email.as_deref(), Some("a@b.com"));
}

/// Once verified the flow is terminal; further operations are rejected
/// locally without touching the gateway.
#[tokio::test]
async fn test_operations_after_verified_are_rejected() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    let mut coordinator = coordinator_with(&gateway, &store);

    gateway.push_reset_ok(None);
    coordinator.request_code("a@b.com").await.unwrap();
    gateway.push_verify_ok(None, Some("tok_xyz"));
    coordinator.verify_code("123456").await.unwrap();

    let reset_calls = gateway.reset_call_count();
    let verify_calls = gateway.verify_call_count();

    assert!(matches!(
        coordinator.request_code("a@b.com").await.unwrap_err(),
        RecoveryError::InvalidStage(_)
    ));
    assert!(matches!(
        coordinator.resend_code().await.unwrap_err(),
        RecoveryError::InvalidStage(_)
    ));
    assert!(matches!(
        coordinator.verify_code("123456").await.unwrap_err(),
        RecoveryError::InvalidStage(_)
    ));

    assert_eq!(gateway.reset_call_count(), reset_calls);
    assert_eq!(gateway.verify_call_count(), verify_calls);
    assert_eq!(coordinator.session().stage, Stage::Verified);
    assert_eq!(coordinator.session().token.as_deref(), Some("tok_xyz"));
}
