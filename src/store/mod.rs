//! Durable Recovery-State Store
//!
//! Key-value storage that outlives a single run of the process. Bridges the
//! recovery email and token across the multi-step flow, so an attempt can be
//! resumed after a full reload of the execution context.

pub mod persistence;

pub use persistence::SledDurableStore;

use crate::error::StorageError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Store key for the address a reset code was requested for
pub const EMAIL_KEY: &str = "email";

/// Store key for the short-lived recovery credential
pub const TOKEN_KEY: &str = "token";

/// Durable store interface
///
/// Reads and writes are synchronous. Values are plain UTF-8 strings; the
/// token value is sensitive and short-lived, so callers should `remove` it
/// as soon as the password-reset step has consumed it.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory implementation of DurableStore
///
/// Does not survive a process restart; intended for tests and short-lived
/// embedders. Production callers want [`SledDurableStore`].
#[derive(Default)]
pub struct MemoryDurableStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryDurableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
