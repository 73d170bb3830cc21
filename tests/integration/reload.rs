//! Integration tests for surviving a full reload of the execution context

use super::test_utils::ScriptedGateway;
use regain::coordinator::RecoveryCoordinator;
use regain::session::Stage;
use regain::store::{DurableStore, MemoryDurableStore, SledDurableStore, TOKEN_KEY};
use std::sync::Arc;
use tempfile::TempDir;

/// The central reload scenario: request a code, throw the coordinator away,
/// build a fresh one over the same sled directory, and verify. The address
/// must come back from the durable store.
#[tokio::test]
async fn test_reload_between_request_and_verify() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(ScriptedGateway::new());

    {
        let store = Arc::new(SledDurableStore::new(dir.path()).unwrap());
        let mut coordinator = RecoveryCoordinator::new(gateway.clone(), store).unwrap();
        gateway.push_reset_ok(None);
        coordinator.request_code("a@b.com").await.unwrap();
    }

    let store = Arc::new(SledDurableStore::new(dir.path()).unwrap());
    let mut coordinator = RecoveryCoordinator::new(gateway.clone(), store.clone()).unwrap();
    assert_eq!(coordinator.session().stage, Stage::CodeSent);
    assert_eq!(coordinator.session().email.as_deref(), Some("a@b.com"));

    gateway.push_verify_ok(None, Some("tok_xyz"));
    coordinator.verify_code("123456").await.unwrap();

    assert_eq!(
        gateway.seen_verify_requests(),
        vec![("a@b.com".to_string(), "123456".to_string())]
    );
    assert_eq!(coordinator.session().stage, Stage::Verified);
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok_xyz"));
}

/// A reload after verification resumes at Verified with the token intact.
#[tokio::test]
async fn test_reload_after_verified_resumes_with_token() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());

    {
        let mut coordinator =
            RecoveryCoordinator::new(gateway.clone(), store.clone()).unwrap();
        gateway.push_reset_ok(None);
        coordinator.request_code("a@b.com").await.unwrap();
        gateway.push_verify_ok(None, Some("tok_xyz"));
        coordinator.verify_code("123456").await.unwrap();
    }

    let coordinator = RecoveryCoordinator::new(gateway.clone(), store.clone()).unwrap();
    assert_eq!(coordinator.session().stage, Stage::Verified);
    assert_eq!(coordinator.session().token.as_deref(), Some("tok_xyz"));
    assert_eq!(coordinator.session().email.as_deref(), Some("a@b.com"));
}

/// A token left behind without a matching email is discarded on hydration.
#[tokio::test]
async fn test_reload_discards_stale_token_without_email() {
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemoryDurableStore::new());
    store.set(TOKEN_KEY, "tok_stale").unwrap();

    let coordinator = RecoveryCoordinator::new(gateway, store.clone()).unwrap();
    assert_eq!(coordinator.session().stage, Stage::Idle);
    assert!(coordinator.session().token.is_none());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}
